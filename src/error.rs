//! 统一错误类型模块
//!
//! 提供 otpauth 库中所有操作的错误类型定义。
//!
//! 构造期错误（[`ConfigError`]）在创建 HOTP/TOTP 实例时同步返回，失败时不会产生任何实例；
//! 调用期错误（[`ValidationError`]、[`EncodingError`]）直接返回给调用方，库内部不做重试。

use std::fmt;

/// otpauth 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// otpauth 库的错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 配置错误（构造 HOTP/TOTP 时）
    Config(ConfigError),

    /// 验证码校验错误
    Validation(ValidationError),

    /// 编码错误（Base32 密钥或 otpauth URI）
    Encoding(EncodingError),

    /// 加密错误
    Crypto(CryptoError),
}

impl Error {
    /// 是否为验证码不匹配
    pub fn is_code_invalid(&self) -> bool {
        matches!(self, Error::Validation(ValidationError::CodeInvalid))
    }

    /// 是否为验证码长度不匹配
    pub fn is_length_mismatch(&self) -> bool {
        matches!(
            self,
            Error::Validation(ValidationError::CodeLengthMismatch { .. })
        )
    }
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 不支持的哈希算法
    UnsupportedAlgorithm(String),
    /// 位数为 0
    NoDigits,
    /// 位数超出上限
    DigitsTooLarge { max: u32, actual: u32 },
    /// 签发者为空
    EmptyIssuer,
    /// 时间步长无效（为 0）
    PeriodInvalid,
    /// 时间偏差窗口超出上限
    SkewInvalid { max: u32, actual: u32 },
}

/// 验证码校验相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 验证码长度与配置的位数不一致
    CodeLengthMismatch { expected: usize, actual: usize },
    /// 没有任何候选计数器匹配
    CodeInvalid,
}

/// 编码相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Base32 密钥格式无效
    SecretInvalid(String),
    /// otpauth URI 语法无效
    UriInvalid(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
    /// HMAC 密钥无效
    InvalidKey(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Encoding(e) => write!(f, "Encoding error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported algorithm: {}", alg)
            }
            ConfigError::NoDigits => write!(f, "digits must be greater than zero"),
            ConfigError::DigitsTooLarge { max, actual } => {
                write!(f, "too many digits: maximum {}, got {}", max, actual)
            }
            ConfigError::EmptyIssuer => write!(f, "empty issuer"),
            ConfigError::PeriodInvalid => write!(f, "period is not valid"),
            ConfigError::SkewInvalid { max, actual } => {
                write!(f, "skew is not valid: maximum {}, got {}", max, actual)
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CodeLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "code length mismatch: expected {} digits, got {}",
                    expected, actual
                )
            }
            ValidationError::CodeInvalid => write!(f, "code is not valid"),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::SecretInvalid(msg) => write!(f, "invalid base32 secret: {}", msg),
            EncodingError::UriInvalid(msg) => write!(f, "invalid otpauth uri: {}", msg),
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
            CryptoError::InvalidKey(msg) => write!(f, "invalid hmac key: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Validation(e) => Some(e),
            Error::Encoding(e) => Some(e),
            Error::Crypto(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for EncodingError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<EncodingError> for Error {
    fn from(err: EncodingError) -> Self {
        Error::Encoding(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}
