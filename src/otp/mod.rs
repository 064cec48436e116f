//! 一次性密码 (OTP) 模块
//!
//! ## 组成
//!
//! - **algorithm**: 哈希算法选择 (SHA1 / SHA256 / SHA512)
//! - **digits**: 验证码位数与补零格式化
//! - **secret**: Base32 共享密钥编解码
//! - **hotp**: 基于计数器的一次性密码 (RFC 4226)
//! - **totp**: 基于时间的一次性密码 (RFC 6238)
//! - **key**: otpauth:// 密钥 URI 解析
//!
//! ## 示例
//!
//! ```rust
//! use otpauth::otp::{Key, Totp};
//!
//! let key = Key::parse(
//!     "otpauth://totp/ACME:alice@example.com?secret=JBSWY3DPEHPK3PXP&issuer=ACME&digits=6",
//! )
//! .unwrap();
//!
//! // 用 URI 中的参数构造 TOTP，允许前后各 1 个时间步的偏差
//! let totp = Totp::from_key(&key, 1).unwrap();
//! let code = totp.generate_code_now(key.secret()).unwrap();
//! assert!(totp.validate_now(&code, key.secret()).is_ok());
//! ```

pub mod algorithm;
pub mod digits;
pub mod hotp;
pub mod key;
pub mod secret;
pub mod totp;

pub use algorithm::Algorithm;
pub use digits::{Digits, MAX_DIGITS};
pub use hotp::{Hotp, HotpConfig};
pub use key::Key;
pub use secret::{Secret, decode_secret, encode_secret};
pub use totp::{MAX_SKEW, Totp, TotpConfig};
