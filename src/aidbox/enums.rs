//! String-marshalled enums
//!
//! Aidbox encodes these as plain JSON strings. Unknown values are rejected
//! with [`AidboxError::InvalidEnum`] both when parsing attribute input and
//! when decoding server responses.

use super::error::AidboxError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            /// Wire values of every member
            pub fn values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl FromStr for $name {
            type Err = AidboxError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(AidboxError::InvalidEnum {
                        message: $error,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// OAuth grant types a client may use
    GrantType, "Unsupported grant type" {
        Basic => "basic",
        AuthorizationCode => "authorization_code",
        Code => "code",
        Password => "password",
        ClientCredentials => "client_credentials",
        Implicit => "implicit",
        RefreshToken => "refresh_token",
    }
}

string_enum! {
    /// Evaluation engine of an access policy
    AccessPolicyEngine, "Invalid access policy engine type" {
        JsonSchema => "json-schema",
        Allow => "allow",
        Sql => "sql",
        Complex => "complex",
        Matcho => "matcho",
        Clj => "clj",
    }
}

string_enum! {
    TokenIntrospectorType, "Invalid token introspector type" {
        Jwt => "jwt",
        Opaque => "opaque",
    }
}

string_enum! {
    /// FHIR search parameter types (shared by both search parameter formats)
    SearchParameterType, "Unsupported search parameter type" {
        String => "string",
        Number => "number",
        Date => "date",
        Token => "token",
        Quantity => "quantity",
        Reference => "reference",
        Uri => "uri",
        Composite => "composite",
    }
}

string_enum! {
    /// Where an identity provider reads user claims from
    UserinfoSource, "Invalid userinfo-source" {
        IdToken => "id-token",
        UserinfoEndpoint => "userinfo-endpoint",
    }
}
