use super::codes::ErrorCode;

/// Which part of the system produced an error, by thousands digit
///
/// | Range | Category |
/// |-------|----------|
/// | 0xxx | General |
/// | 1xxx | Auth |
/// | 2xxx | Permission |
/// | 3xxx | Identity |
/// | 4xxx | Issue |
/// | 5xxx | Payment |
/// | 9xxx, unmapped | System |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Identity,
    Issue,
    Payment,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Permission,
            3 => Self::Identity,
            4 => Self::Issue,
            5 => Self::Payment,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
