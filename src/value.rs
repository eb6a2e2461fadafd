use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
        }
    }

    /// Converts one line typed by the user: text without a `.` becomes an
    /// `Int` when it parses as one, text with a `.` becomes a `Float` when it
    /// parses as one, and anything else is kept verbatim.
    pub fn from_input(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.contains('.') {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Value::Float(f);
            }
        } else if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Int(n);
        }
        Value::String(text.to_string())
    }

    /// Numeric reading of a string result: all digits become `Int`, other
    /// float-parsable text containing a digit becomes `Float`. Words such as
    /// `inf` or `nan` stay strings, as do non-string values.
    pub fn coerce_numeric(self) -> Self {
        match self {
            Value::String(text) => {
                if !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit()) {
                    if let Ok(n) = text.parse::<i64>() {
                        return Value::Int(n);
                    }
                }
                if !text.chars().any(|ch| ch.is_ascii_digit()) {
                    return Value::String(text);
                }
                match text.trim().parse::<f64>() {
                    Ok(f) => Value::Float(f),
                    Err(_) => Value::String(text),
                }
            }
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::String(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // `{:e}` yields `1e20` / `1.5e-7`; pad the exponent to `e+20` / `e-07`.
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => formatted,
        };
    }
    let formatted = format!("{value}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}
