//! License records from the Hub admin API.
//!
//! Wire rows keep the Portuguese field names the Hub has always served
//! (`cliente`, `modulo`, `expira`); `LicenseRecord` is the typed form
//! handed to the frontend.

use serde::{Deserialize, Serialize};

/// Commercial state of a license.
///
/// The wire strings are the display values the Hub serves; they stay
/// stable so older panels keep working. The set is closed: anything
/// else makes the record malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseStatus {
    #[serde(rename = "Ativa")]
    Active,
    #[serde(rename = "Expirando")]
    Expiring,
    #[serde(rename = "Suspensa")]
    Suspended,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Ativa",
            Self::Expiring => "Expirando",
            Self::Suspended => "Suspensa",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Ativa" => Some(Self::Active),
            "Expirando" => Some(Self::Expiring),
            "Suspensa" => Some(Self::Suspended),
            _ => None,
        }
    }

    pub fn all() -> &'static [LicenseStatus] {
        &[Self::Active, Self::Expiring, Self::Suspended]
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw license row as served by `GET /licenses`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseStub {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub cliente: String,
    #[serde(default)]
    pub modulo: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub expira: String,
}

/// A typed license record for the admin panel. Read-only: the console
/// displays licenses, it never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: String,
    pub client: String,
    pub enabled_modules: String,
    pub status: LicenseStatus,
    pub expiry: String,
}

/// A wire row carrying a status string outside the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("License {id}: unknown status '{status}'")]
pub struct UnknownLicenseStatus {
    pub id: String,
    pub status: String,
}

impl TryFrom<LicenseStub> for LicenseRecord {
    type Error = UnknownLicenseStatus;

    fn try_from(stub: LicenseStub) -> Result<Self, Self::Error> {
        let status = LicenseStatus::from_str(&stub.status).ok_or_else(|| UnknownLicenseStatus {
            id: stub.id.clone(),
            status: stub.status.clone(),
        })?;
        Ok(Self {
            id: stub.id,
            client: stub.cliente,
            enabled_modules: stub.modulo,
            status,
            expiry: stub.expira,
        })
    }
}
