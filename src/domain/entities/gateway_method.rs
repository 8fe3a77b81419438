use serde::{Deserialize, Serialize};

/// Payment methods offered by the Pakasir gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gateway_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GatewayMethod {
    Qris,
    BriVa,
    BniVa,
    CimbNiagaVa,
    PermataVa,
    MaybankVa,
}

impl GatewayMethod {
    pub const ALL: [GatewayMethod; 6] = [
        GatewayMethod::Qris,
        GatewayMethod::BriVa,
        GatewayMethod::BniVa,
        GatewayMethod::CimbNiagaVa,
        GatewayMethod::PermataVa,
        GatewayMethod::MaybankVa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayMethod::Qris => "qris",
            GatewayMethod::BriVa => "bri_va",
            GatewayMethod::BniVa => "bni_va",
            GatewayMethod::CimbNiagaVa => "cimb_niaga_va",
            GatewayMethod::PermataVa => "permata_va",
            GatewayMethod::MaybankVa => "maybank_va",
        }
    }

    /// QR methods embed the scannable payload in the provider's payment number.
    pub fn is_qr(&self) -> bool {
        matches!(self, GatewayMethod::Qris)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GatewayMethod::Qris => "QRIS",
            GatewayMethod::BriVa => "BRI Virtual Account",
            GatewayMethod::BniVa => "BNI Virtual Account",
            GatewayMethod::CimbNiagaVa => "CIMB Niaga Virtual Account",
            GatewayMethod::PermataVa => "Permata Virtual Account",
            GatewayMethod::MaybankVa => "Maybank Virtual Account",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GatewayMethod::Qris => "GoPay, OVO, Dana, ShopeePay and other QRIS wallets",
            GatewayMethod::BriVa => "Bank transfer via BRI",
            GatewayMethod::BniVa => "Bank transfer via BNI",
            GatewayMethod::CimbNiagaVa => "Bank transfer via CIMB Niaga",
            GatewayMethod::PermataVa => "Bank transfer via Permata",
            GatewayMethod::MaybankVa => "Bank transfer via Maybank",
        }
    }
}

impl std::fmt::Display for GatewayMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GatewayMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qris" => Ok(GatewayMethod::Qris),
            "bri_va" => Ok(GatewayMethod::BriVa),
            "bni_va" => Ok(GatewayMethod::BniVa),
            "cimb_niaga_va" => Ok(GatewayMethod::CimbNiagaVa),
            "permata_va" => Ok(GatewayMethod::PermataVa),
            "maybank_va" => Ok(GatewayMethod::MaybankVa),
            _ => Err(format!("Unknown gateway method: {}", s)),
        }
    }
}
