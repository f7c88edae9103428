//! Currency codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Currencies the service quotes amounts in (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    RUB,
    USD,
    EUR,
    GBP,
    CNY,
    KZT,
    BYN,
    UAH,
}

impl Currency {
    const ALL: [Currency; 8] = [
        Self::RUB,
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::CNY,
        Self::KZT,
        Self::BYN,
        Self::UAH,
    ];

    /// Alphabetic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::RUB => "RUB",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CNY => "CNY",
            Self::KZT => "KZT",
            Self::BYN => "BYN",
            Self::UAH => "UAH",
        }
    }

    /// Numeric code, as the service sends it in forms
    pub fn numeric_code(&self) -> u16 {
        match self {
            Self::RUB => 643,
            Self::USD => 840,
            Self::EUR => 978,
            Self::GBP => 826,
            Self::CNY => 156,
            Self::KZT => 398,
            Self::BYN => 933,
            Self::UAH => 980,
        }
    }

    /// Get currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::RUB => "₽",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::CNY => "¥",
            Self::KZT => "₸",
            Self::BYN => "Br",
            Self::UAH => "₴",
        }
    }

    /// Get decimal places
    pub fn decimals(&self) -> u32 {
        2
    }

    /// Parse from an alphabetic or numeric code
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        match code.parse::<u16>() {
            Ok(numeric) => Self::ALL.into_iter().find(|c| c.numeric_code() == numeric),
            Err(_) => Self::ALL
                .into_iter()
                .find(|c| c.code().eq_ignore_ascii_case(code)),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.numeric_code().to_string())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Code {
            Numeric(u16),
            Text(String),
        }

        let code = match Code::deserialize(deserializer)? {
            Code::Numeric(n) => n.to_string(),
            Code::Text(s) => s,
        };
        Currency::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown currency: {}", code)))
    }
}
