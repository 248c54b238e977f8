//! A macro for enums that are stored as text and sent as upper case strings.

/// Define an enum whose variants map to fixed strings, e.g. `INCOME`.
///
/// The generated enum serializes to and from those strings with serde, and
/// is stored as TEXT in SQLite.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$variant_meta])* #[serde(rename = $text)] $variant, )+
        }

        impl $name {
            /// The text representation of the variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                match text {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(format!("unknown {} \"{other}\"", stringify!($name))),
                }
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(self.as_str().into())
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error: String| rusqlite::types::FromSqlError::Other(error.into()))
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    text_enum! {
        /// A test enum.
        pub enum Colour {
            Red => "RED",
            LightBlue => "LIGHT_BLUE",
        }
    }

    #[test]
    fn serializes_as_text() {
        assert_eq!(serde_json::to_string(&Colour::LightBlue).unwrap(), "\"LIGHT_BLUE\"");
        assert_eq!(
            serde_json::from_str::<Colour>("\"RED\"").unwrap(),
            Colour::Red
        );
    }

    #[test]
    fn unknown_text_fails_to_parse() {
        assert!("GREEN".parse::<Colour>().is_err());
    }

    #[test]
    fn stores_as_text_in_sqlite() {
        let conn = Connection::open_in_memory().unwrap();

        let stored: String = conn
            .query_row("SELECT ?1", [Colour::LightBlue], |row| row.get(0))
            .unwrap();
        let loaded: Colour = conn
            .query_row("SELECT 'RED'", [], |row| row.get(0))
            .unwrap();

        assert_eq!(stored, "LIGHT_BLUE");
        assert_eq!(loaded, Colour::Red);
    }
}
