//! Modelos del sistema
//!
//! Este módulo contiene las entidades que mapean exactamente a las tablas
//! de PostgreSQL definidas en `migrations/`.

use thiserror::Error;

/// Valor de texto en base de datos que no corresponde a ninguna variante.
#[derive(Debug, Error)]
#[error("valor desconocido para {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Enum almacenado como VARCHAR con un CHECK en la tabla.
///
/// Genera `as_str`, `Display`, `TryFrom<String>` (para `#[sqlx(try_from)]`)
/// y la (de)serialización en minúsculas.
macro_rules! db_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err($crate::models::UnknownVariant {
                        kind: stringify!($name),
                        value,
                    }),
                }
            }
        }
    };
}

pub mod appointment;
pub mod hospitalization;
pub mod medical_record;
pub mod notification;
pub mod person;
pub mod pet;
pub mod species;
pub mod surgical_consent;
pub mod treatment;
pub mod user;
pub mod vaccination;

#[cfg(test)]
mod tests {
    use super::person::PersonRole;

    #[test]
    fn test_db_enum_round_trip_text() {
        assert_eq!(PersonRole::try_from("staff".to_string()).unwrap(), PersonRole::Staff);
        assert_eq!(PersonRole::Cliente.as_str(), "cliente");
        assert_eq!(PersonRole::Staff.to_string(), "staff");
    }

    #[test]
    fn test_db_enum_unknown_value() {
        let err = PersonRole::try_from("doctor".to_string()).unwrap_err();
        assert_eq!(err.value, "doctor");
        assert_eq!(err.kind, "PersonRole");
    }

    #[test]
    fn test_db_enum_serde() {
        let json = serde_json::to_string(&PersonRole::Staff).unwrap();
        assert_eq!(json, "\"staff\"");
        let parsed: PersonRole = serde_json::from_str("\"cliente\"").unwrap();
        assert_eq!(parsed, PersonRole::Cliente);
    }
}
