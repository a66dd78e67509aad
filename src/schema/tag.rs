use crate::core::{ErrorKind, SQLError};

/// One option of a field tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagOption {
    /// `size:<n>`, appended to the column type as `(n)`.
    Size(u32),
    /// `default:<literal>`
    Default(String),
    PrimaryKey,
    AutoIncrement,
    Unique,
    NotNull,
}

/// A parsed field tag: `<name>[,<option>[:<value>]]*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    /// Explicit column name, `None` when the first token is blank.
    pub column_name: Option<String>,
    pub options: Vec<TagOption>,
}

impl Tag {
    /// Parse the tag of field `field`. Tokens are trimmed; `size` and
    /// `default` need a value, every other option must not carry one.
    pub fn parse(field: &str, tag: &str) -> Result<Self, SQLError> {
        let mut tokens = tag.split(',');

        let column_name = tokens
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let options = tokens
            .map(|token| parse_option(field, token.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Tag {
            column_name,
            options,
        })
    }
}

fn parse_option(field: &str, token: &str) -> Result<TagOption, SQLError> {
    let malformed = |message: String| SQLError::new(ErrorKind::MalformedTagOption, message);

    let (name, value) = match token.split_once(':') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (token, None),
    };

    match (name, value) {
        ("size" | "default", None | Some("")) => Err(malformed(format!(
            "missing option value for option {} on field {}",
            name, field
        ))),
        ("size", Some(value)) => value
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .map(TagOption::Size)
            .ok_or_else(|| {
                malformed(format!(
                    "invalid size {:?} on field {}",
                    value, field
                ))
            }),
        ("default", Some(value)) => Ok(TagOption::Default(value.to_string())),
        ("primarykey" | "autoincrement" | "unique" | "notnull", Some(_)) => Err(malformed(
            format!("unexpected option value for option {} on field {}", name, field),
        )),
        ("primarykey", None) => Ok(TagOption::PrimaryKey),
        ("autoincrement", None) => Ok(TagOption::AutoIncrement),
        ("unique", None) => Ok(TagOption::Unique),
        ("notnull", None) => Ok(TagOption::NotNull),
        _ => Err(malformed(format!(
            "unrecognized tag option for field {}: {:?}",
            field, name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_options() {
        let tag = Tag::parse("id", "_id, primarykey, autoincrement, notnull").unwrap();
        assert_eq!(tag.column_name.as_deref(), Some("_id"));
        assert_eq!(
            tag.options,
            vec![
                TagOption::PrimaryKey,
                TagOption::AutoIncrement,
                TagOption::NotNull
            ]
        );

        let tag = Tag::parse("Name", ",unique, default:zhang, notnull, size:20").unwrap();
        assert_eq!(tag.column_name, None);
        assert_eq!(
            tag.options,
            vec![
                TagOption::Unique,
                TagOption::Default("zhang".to_string()),
                TagOption::NotNull,
                TagOption::Size(20)
            ]
        );
    }

    #[test]
    fn test_empty_tag() {
        assert_eq!(Tag::parse("Name", "").unwrap(), Tag::default());
        assert_eq!(Tag::parse("Name", "  ").unwrap(), Tag::default());
    }

    #[test]
    fn test_value_arity_is_enforced() {
        for tag in [
            "a,size",
            "a,default",
            "a,default:",
            "a,primarykey:1",
            "a,notnull:yes",
            "a,unique:",
        ] {
            let err = Tag::parse("f", tag).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedTagOption, "tag: {:?}", tag);
        }
    }

    #[test]
    fn test_unrecognized_and_invalid_options() {
        for tag in ["a,index", "a,PrimaryKey", "a,", "a,size:0", "a,size:big"] {
            let err = Tag::parse("f", tag).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedTagOption, "tag: {:?}", tag);
        }
    }
}
