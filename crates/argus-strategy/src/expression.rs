use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One raw condition entry from a strategy document: either a bare
/// comparison string (`"cpu.user>90"`) or a record that additionally
/// carries an aggregation function, a time range and a sampling rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Simple(String),
    Rich {
        expr: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        func: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sampling: Option<f64>,
    },
}

/// Comparison operator inside a condition expression.
///
/// The textual forms are matched in a fixed priority order so that the
/// two-character operators win over the single characters they contain
/// (`:=` before `=`, `!=` before `=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// `:=` — pattern match, interpreted by the evaluator.
    Match,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `=`
    Equal,
}

/// Scan order for operator detection. Order is significant.
const OPERATOR_SCAN_ORDER: [CompareOp; 5] = [
    CompareOp::Match,
    CompareOp::NotEqual,
    CompareOp::GreaterThan,
    CompareOp::LessThan,
    CompareOp::Equal,
];

impl CompareOp {
    /// The operator's literal form as it appears in condition text.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Match => ":=",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Equal => "=",
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl std::str::FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ":=" => Ok(Self::Match),
            "!=" => Ok(Self::NotEqual),
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            "=" => Ok(Self::Equal),
            _ => Err(format!("unknown compare operator: {s}")),
        }
    }
}

/// A single compiled comparison: `argument OPERATOR value`, optionally
/// windowed over a time range and aggregated.
///
/// An expression whose text contains none of the recognized operators is
/// kept in a degenerate form with `arg`/`operator`/`expected_value` all
/// unset; it still occupies its slot in the strategy-global index space
/// used by relation compilation.
#[derive(Debug, Clone, Serialize)]
pub struct Expression {
    idx: usize,
    arg: Option<String>,
    operator: Option<CompareOp>,
    expected_value: Option<String>,
    range_ms: u64,
    func: Option<String>,
    sampling: f64,
    match_segments: BTreeSet<String>,
}

impl Expression {
    /// Compile one raw condition entry, assigning its position in the
    /// strategy-global flat expression list.
    pub fn compile(spec: &ConditionSpec, idx: usize) -> Self {
        match spec {
            ConditionSpec::Simple(text) => Self::from_text(text, idx),
            ConditionSpec::Rich {
                expr,
                func,
                range,
                sampling,
            } => {
                let mut compiled = Self::from_text(expr, idx);
                if let Some(secs) = range {
                    if *secs > 0 {
                        compiled.range_ms = *secs as u64 * 1000;
                    }
                }
                compiled.func = func.clone();
                if let Some(rate) = sampling {
                    compiled.sampling = *rate;
                }
                compiled
            }
        }
    }

    fn from_text(text: &str, idx: usize) -> Self {
        let mut expr = Expression {
            idx,
            arg: None,
            operator: None,
            expected_value: None,
            range_ms: 0,
            func: None,
            sampling: 1.0,
            match_segments: BTreeSet::new(),
        };

        for op in OPERATOR_SCAN_ORDER {
            // Split once on the first occurrence; the right-hand side may
            // itself contain operator characters and is kept verbatim.
            if let Some((lhs, rhs)) = text.split_once(op.token()) {
                let arg = lhs.trim().to_string();
                expr.match_segments = wildcard_segments(&arg);
                expr.arg = Some(arg);
                expr.operator = Some(op);
                expr.expected_value = Some(rhs.to_string());
                return expr;
            }
        }

        tracing::warn!(idx, text, "expression contains no recognized operator");
        expr
    }

    /// Whether this expression's argument carries `*` wildcard segments.
    ///
    /// [`Expression::match_target_args`] is only meaningful when this
    /// returns true.
    pub fn is_match_expr(&self) -> bool {
        !self.match_segments.is_empty()
    }

    /// Select the candidate argument names matched by this expression's
    /// wildcard pattern.
    ///
    /// A candidate matches when every literal segment of the pattern
    /// occurs somewhere in it as a substring. Segment order and position
    /// are not checked.
    pub fn match_target_args<'a, I>(&self, candidates: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter(|candidate| {
                self.match_segments
                    .iter()
                    .all(|segment| candidate.contains(segment.as_str()))
            })
            .map(str::to_string)
            .collect()
    }

    /// Position in the strategy-global flat expression list.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Raw argument name (left-hand side); `None` for a degenerate
    /// operator-less expression.
    pub fn arg(&self) -> Option<&str> {
        self.arg.as_deref()
    }

    pub fn operator(&self) -> Option<CompareOp> {
        self.operator
    }

    /// Raw right-hand-side text, untrimmed.
    pub fn expected_value(&self) -> Option<&str> {
        self.expected_value.as_deref()
    }

    /// Sliding-window length in milliseconds; 0 means a point-in-time check.
    pub fn range_ms(&self) -> u64 {
        self.range_ms
    }

    /// Aggregation function applied over the range window, if any.
    pub fn func(&self) -> Option<&str> {
        self.func.as_deref()
    }

    /// Down-sampling rate in (0, 1]; 1.0 means every sample is considered.
    pub fn sampling(&self) -> f64 {
        self.sampling
    }

    /// Literal substrings of the argument pattern, split on `*`.
    pub fn match_segments(&self) -> &BTreeSet<String> {
        &self.match_segments
    }
}

/// Split an argument name on `*`, keeping the non-empty literal pieces.
/// An argument without `*` yields no segments at all.
fn wildcard_segments(arg: &str) -> BTreeSet<String> {
    if !arg.contains('*') {
        return BTreeSet::new();
    }
    arg.split('*')
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
