//! # otpauth
//!
//! 一次性密码 (OTP) 的生成与验证库。
//!
//! ## 功能特性
//!
//! - **HOTP**: 基于计数器的一次性密码 (RFC 4226)
//! - **TOTP**: 基于时间的一次性密码 (RFC 6238)，支持时钟偏差窗口
//! - **otpauth URI**: 解析与生成认证器应用使用的 `otpauth://` 密钥 URI
//! - **Base32 密钥**: 容忍缺失填充的密钥解码
//! - **常量时间比较**: 防止针对验证码的时序攻击
//!
//! 本库只做计算：密钥存储、计数器持久化、二维码渲染以及验证尝试的限流都由调用方负责。
//!
//! ## Features
//!
//! - `gen-secret` - 启用基于操作系统 CSPRNG 的密钥生成（默认启用）
//!
//! ## HOTP 示例
//!
//! ```rust
//! use otpauth::{Hotp, HotpConfig};
//!
//! let hotp = Hotp::new(HotpConfig::new().with_issuer("cristalhq").with_digits(10)).unwrap();
//!
//! let code = hotp.generate_code(42, "JBSWY3DPEHPK3PXP").unwrap();
//! assert_eq!(code, "0979090604");
//!
//! hotp.validate(&code, 42, "JBSWY3DPEHPK3PXP").unwrap();
//! ```
//!
//! ## TOTP 示例
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use otpauth::{Totp, TotpConfig};
//!
//! let totp = Totp::new(
//!     TotpConfig::new()
//!         .with_issuer("cristalhq")
//!         .with_digits(10)
//!         .with_period(30)
//!         .with_skew(2),
//! )
//! .unwrap();
//!
//! let at = Utc.with_ymd_and_hms(2023, 11, 26, 12, 15, 18).unwrap();
//! let code = totp.generate_code("JBSWY3DPEHPK3PXP", at).unwrap();
//! assert_eq!(code, "0462778229");
//!
//! totp.validate(&code, at, "JBSWY3DPEHPK3PXP").unwrap();
//!
//! let url = totp.generate_url("alice@bob.com", b"SECRET_STRING");
//! assert_eq!(
//!     url,
//!     "otpauth://totp/cristalhq:alice@bob.com?algorithm=SHA1&digits=10&issuer=cristalhq&period=30&secret=KNCUGUSFKRPVGVCSJFHEO"
//! );
//! ```

pub mod error;
pub mod otp;
pub mod random;

pub use error::{Error, Result};

// ============================================================================
// OTP 相关导出
// ============================================================================

pub use otp::algorithm::Algorithm;
pub use otp::digits::{Digits, MAX_DIGITS};
pub use otp::hotp::{Hotp, HotpConfig};
pub use otp::key::Key;
pub use otp::secret::{Secret, decode_secret, encode_secret};
pub use otp::totp::{MAX_SKEW, Totp, TotpConfig};

// ============================================================================
// 随机数与比较函数导出
// ============================================================================

#[cfg(feature = "gen-secret")]
pub use random::generate_random_bytes;
pub use random::constant_time_compare;
