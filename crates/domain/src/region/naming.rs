use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between page name segments
pub const NAME_SEPARATOR: &str = ":";

/// One or more page name segments as supplied by a call site.
///
/// A single string and a list of strings are both accepted; segments that
/// normalize to nothing are dropped when the name is joined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct PageDescriptor(Vec<Value>);

impl PageDescriptor {
    pub fn new(segments: Vec<Value>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Value] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|segment| normalize_text(segment).is_empty())
    }
}

impl From<Value> for PageDescriptor {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(items),
            other => Self(vec![other]),
        }
    }
}

impl From<PageDescriptor> for Value {
    fn from(descriptor: PageDescriptor) -> Self {
        Value::Array(descriptor.0)
    }
}

impl From<&str> for PageDescriptor {
    fn from(segment: &str) -> Self {
        Self(vec![Value::from(segment)])
    }
}

impl From<String> for PageDescriptor {
    fn from(segment: String) -> Self {
        Self(vec![Value::from(segment)])
    }
}

impl From<Vec<&str>> for PageDescriptor {
    fn from(segments: Vec<&str>) -> Self {
        Self(segments.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for PageDescriptor {
    fn from(segments: Vec<String>) -> Self {
        Self(segments.into_iter().map(Value::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PageDescriptor {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.into_iter().map(Value::from).collect())
    }
}

/// Lower-cased, trimmed text form of a value.
///
/// Null, `false`, `0` and the empty string all collapse to `""`.
pub fn normalize_text(value: &Value) -> String {
    let text = match value {
        Value::Null | Value::Bool(false) => return String::new(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return String::new(),
        other => display_text(other),
    };
    text.to_lowercase().trim().to_string()
}

/// Convenience form of [`normalize_text`] for plain strings
pub fn normalize_str(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Normalize each segment, drop empty ones and join with `:`
pub fn join_name_segments(segments: &[Value]) -> String {
    segments
        .iter()
        .map(normalize_text)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR)
}

/// Lower snake case with word splitting on case changes and digit runs.
///
/// `"mortgageLength years"` becomes `"mortgage_length_years"`,
/// `"XMLHttpRequest"` becomes `"xml_http_request"`.
pub fn snake_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Key used when recording a field value: dots become word breaks
pub fn field_key(key: &str) -> String {
    snake_case(&key.replace('.', " "))
}

fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();

    for token in input.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = token.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if !current.is_empty() {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();
                let boundary = (prev.is_lowercase() && c.is_uppercase())
                    || (prev.is_alphabetic() && c.is_numeric())
                    || (prev.is_numeric() && c.is_alphabetic())
                    || (prev.is_uppercase()
                        && c.is_uppercase()
                        && next.is_some_and(|n| n.is_lowercase()));
                if boundary {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text() {
        let cases = [
            (json!(" "), ""),
            (json!(0), ""),
            (json!(null), ""),
            (json!(false), ""),
            (json!(1), "1"),
            (json!(" Foo "), "foo"),
            (json!("FOO "), "foo"),
            (json!(" fOo"), "foo"),
            (json!(" foo Bar "), "foo bar"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_text(&input), expected, "input {input}");
        }
    }

    #[test]
    fn test_normalize_float_without_fraction() {
        assert_eq!(normalize_text(&json!(2.0)), "2");
        assert_eq!(normalize_text(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_join_name_segments() {
        let segments = [
            json!(""),
            json!(" "),
            json!(0),
            json!(1),
            json!("0"),
            json!(null),
            json!(false),
        ];
        assert_eq!(join_name_segments(&segments), "1:0");
        assert_eq!(join_name_segments(&[json!(" Foo "), json!("baR")]), "foo:bar");
        assert_eq!(
            join_name_segments(&[json!(" FOO "), json!("   "), json!(" BAR ")]),
            "foo:bar"
        );
        assert_eq!(join_name_segments(&[]), "");
    }

    #[test]
    fn test_descriptor_from_single_and_list() {
        assert_eq!(PageDescriptor::from("foo").segments(), &[json!("foo")]);
        assert_eq!(
            PageDescriptor::from(json!(["foo", "bar"])).segments(),
            &[json!("foo"), json!("bar")]
        );
        assert!(PageDescriptor::from(json!(null)).is_empty());
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("mortgageLength"), "mortgage_length");
        assert_eq!(snake_case("mortgageLength years"), "mortgage_length_years");
        assert_eq!(snake_case("XMLHttpRequest"), "xml_http_request");
        assert_eq!(snake_case("foo2Bar"), "foo_2_bar");
        assert_eq!(snake_case("--Foo-Bar--"), "foo_bar");
        assert_eq!(snake_case("ltv"), "ltv");
    }

    #[test]
    fn test_field_key_replaces_dots() {
        assert_eq!(field_key("mortgageLength.years"), "mortgage_length_years");
        assert_eq!(field_key("loanAmount"), "loan_amount");
    }
}
