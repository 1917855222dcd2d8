use chunkload_query::Value;

/// Turns one raw text field into a typed value.
pub trait InferType: Send + Sync {
    fn infer(&self, raw: &str) -> Value;
}

impl<F> InferType for F
where
    F: Fn(&str) -> Value + Send + Sync,
{
    fn infer(&self, raw: &str) -> Value {
        self(raw)
    }
}

/// Coerce fields whose type is unambiguous.
///
/// - blank (after trimming) → `null`
/// - `true` / `false` → boolean
/// - `NaN` → NaN
/// - plain decimal numbers → number
/// - everything else, including numbers with leading zeros such as
///   `06037`, stays the original string
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoType;

impl InferType for AutoType {
    fn infer(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match trimmed {
            "" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "NaN" => Value::Number(f64::NAN),
            _ => match parse_number(trimmed) {
                Some(n) => Value::Number(n),
                None => Value::String(raw.to_string()),
            },
        }
    }
}

/// Leave every field as the original string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl InferType for Verbatim {
    fn infer(&self, raw: &str) -> Value {
        Value::String(raw.to_string())
    }
}

fn parse_number(s: &str) -> Option<f64> {
    // f64::from_str also takes "inf", "nan" and friends
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    let unsigned = s.trim_start_matches(['+', '-']);
    let mut digits = unsigned.bytes();
    if let (Some(b'0'), Some(next)) = (digits.next(), digits.next()) {
        if next.is_ascii_digit() {
            return None;
        }
    }
    s.parse::<f64>().ok()
}
