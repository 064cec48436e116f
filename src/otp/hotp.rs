//! HOTP (基于计数器的一次性密码) 实现模块
//!
//! 提供符合 RFC 4226 的 HOTP 生成与验证。
//!
//! ## 特性
//!
//! - HMAC-SHA1 / SHA256 / SHA512
//! - 动态截断 (RFC 4226 §5.4)
//! - 常量时间比较，防止时序攻击
//! - 生成 otpauth:// URI
//!
//! 计数器由调用方保存和递增，本模块不维护任何状态。
//!
//! ## 示例
//!
//! ```rust
//! use otpauth::otp::hotp::{Hotp, HotpConfig};
//!
//! let hotp = Hotp::new(HotpConfig::new().with_issuer("cristalhq")).unwrap();
//!
//! let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
//! let code = hotp.generate_code(0, secret).unwrap();
//! assert_eq!(code, "755224");
//!
//! hotp.validate(&code, 0, secret).unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::otp::algorithm::Algorithm;
use crate::otp::digits::Digits;
use crate::otp::key::{self, Key};
use crate::otp::secret::{decode_secret, encode_secret};
use crate::random::constant_time_compare;

/// HOTP 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotpConfig {
    /// 哈希算法
    pub algorithm: Algorithm,

    /// 验证码位数，默认 6 位
    pub digits: u32,

    /// 签发者名称（写入 otpauth URI），不能为空
    pub issuer: String,
}

impl Default for HotpConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha1,
            digits: 6,
            issuer: String::new(),
        }
    }
}

impl HotpConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置哈希算法
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 设置验证码位数
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// 设置签发者
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    fn validate(&self) -> Result<Digits> {
        if self.issuer.is_empty() {
            return Err(ConfigError::EmptyIssuer.into());
        }
        Digits::new(self.digits)
    }
}

/// HOTP 生成器与验证器
///
/// 构造后不可变，可以在多个线程间共享。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotp {
    algorithm: Algorithm,
    digits: Digits,
    issuer: String,
}

impl Hotp {
    /// 根据配置创建 HOTP
    ///
    /// 位数为 0 返回 [`ConfigError::NoDigits`]，超过 10 位返回 [`ConfigError::DigitsTooLarge`]，
    /// 签发者为空返回 [`ConfigError::EmptyIssuer`]。
    pub fn new(config: HotpConfig) -> Result<Self> {
        let digits = config.validate().inspect_err(|err| {
            tracing::debug!(error = %err, "rejected HOTP config");
        })?;

        Ok(Self {
            algorithm: config.algorithm,
            digits,
            issuer: config.issuer,
        })
    }

    /// 根据解析出的 otpauth URI 创建 HOTP
    ///
    /// 缺失 `algorithm` 时按 SHA1 处理，缺失 `digits` 时按 6 位处理；
    /// 显式给出但无法识别的算法返回 [`ConfigError::UnsupportedAlgorithm`]。
    pub fn from_key(key: &Key) -> Result<Self> {
        Self::new(config_from_key(key)?)
    }

    /// 生成指定计数器的验证码
    ///
    /// # 参数
    ///
    /// * `counter` - 计数器值
    /// * `secret` - Base32 编码的密钥（可省略 `=` 填充）
    pub fn generate_code(&self, counter: u64, secret: &str) -> Result<String> {
        let key = decode_secret(secret)?;
        self.code_for(&key, counter)
    }

    /// 验证用户输入的验证码
    ///
    /// 长度不符时在计算任何 HMAC 之前返回 [`ValidationError::CodeLengthMismatch`]；
    /// 不匹配返回 [`ValidationError::CodeInvalid`]。
    pub fn validate(&self, passcode: &str, counter: u64, secret: &str) -> Result<()> {
        self.check_length(passcode)?;

        let key = decode_secret(secret)?;
        if self.matches(&key, passcode, counter)? {
            Ok(())
        } else {
            tracing::trace!(counter, "hotp code mismatch");
            Err(ValidationError::CodeInvalid.into())
        }
    }

    /// 生成 otpauth://hotp URI
    ///
    /// 此 URI 可用于生成二维码，供认证器应用扫描
    pub fn generate_url(&self, account: &str, secret: &[u8]) -> String {
        key::build_uri("hotp", &self.issuer, account, &self.url_params(secret))
    }

    /// 哈希算法
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 验证码位数
    pub fn digits(&self) -> Digits {
        self.digits
    }

    /// 签发者
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// 还原为配置
    pub fn config(&self) -> HotpConfig {
        HotpConfig {
            algorithm: self.algorithm,
            digits: self.digits.into(),
            issuer: self.issuer.clone(),
        }
    }

    // ========================================================================
    // crate 内部方法（TOTP 复用，避免每个候选计数器重复解码密钥）
    // ========================================================================

    pub(crate) fn check_length(&self, passcode: &str) -> Result<()> {
        if passcode.len() != self.digits.length() {
            return Err(ValidationError::CodeLengthMismatch {
                expected: self.digits.length(),
                actual: passcode.len(),
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn matches(&self, key: &[u8], passcode: &str, counter: u64) -> Result<bool> {
        let expected = self.code_for(key, counter)?;
        Ok(constant_time_compare(expected.as_bytes(), passcode.as_bytes()))
    }

    pub(crate) fn code_for(&self, key: &[u8], counter: u64) -> Result<String> {
        let mac = self.algorithm.hmac(key, &counter.to_be_bytes())?;
        let value = u64::from(truncate(&mac));
        Ok(self.digits.format(self.digits.reduce(value)))
    }

    pub(crate) fn url_params(&self, secret: &[u8]) -> Vec<(&'static str, String)> {
        vec![
            ("algorithm", self.algorithm.as_str().to_string()),
            ("digits", self.digits.to_string()),
            ("issuer", self.issuer.clone()),
            ("secret", encode_secret(secret)),
        ]
    }
}

/// 动态截断 (RFC 4226 §5.4)
///
/// 以 HMAC 最后一个字节的低 4 位为偏移，取 4 字节大端整数并清除最高位，得到 31 位值。
/// 三种摘要的输出至少 20 字节，偏移最大 15，读取范围不会越界。
fn truncate(mac: &[u8]) -> u32 {
    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    u32::from_be_bytes([
        mac[offset] & 0x7f,
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ])
}

pub(crate) fn config_from_key(key: &Key) -> Result<HotpConfig> {
    let algorithm = match key.param("algorithm") {
        None => Algorithm::Sha1,
        Some(name) => name.parse::<Algorithm>()?,
    };
    let digits = match key.param("digits") {
        None => Digits::SIX.into(),
        Some(_) => key.digits(),
    };

    Ok(HotpConfig {
        algorithm,
        digits,
        issuer: key.issuer(),
    })
}

impl TryFrom<HotpConfig> for Hotp {
    type Error = Error;

    fn try_from(config: HotpConfig) -> Result<Self> {
        Hotp::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc_secret() -> String {
        encode_secret(b"12345678901234567890")
    }

    fn hotp(digits: u32) -> Hotp {
        Hotp::new(HotpConfig::new().with_digits(digits).with_issuer("cristalhq")).unwrap()
    }

    #[test]
    fn test_hotp_config_default() {
        let config = HotpConfig::default();
        assert_eq!(config.digits, 6);
        assert_eq!(config.algorithm, Algorithm::Sha1);
        assert!(config.issuer.is_empty());
    }

    #[test]
    fn test_hotp_config_builder() {
        let config = HotpConfig::new()
            .with_digits(8)
            .with_algorithm(Algorithm::Sha256)
            .with_issuer("MyApp");

        assert_eq!(config.digits, 8);
        assert_eq!(config.algorithm, Algorithm::Sha256);
        assert_eq!(config.issuer, "MyApp");
    }

    #[test]
    fn test_new_rejects_empty_issuer() {
        let err = Hotp::new(HotpConfig::default()).unwrap_err();
        assert_eq!(err, Error::Config(ConfigError::EmptyIssuer));
    }

    #[test]
    fn test_new_rejects_zero_digits() {
        let err = Hotp::new(HotpConfig::new().with_digits(0).with_issuer("x")).unwrap_err();
        assert_eq!(err, Error::Config(ConfigError::NoDigits));
    }

    #[test]
    fn test_truncate_rfc4226_example() {
        // RFC 4226 §5.4 中的示例 HMAC
        let mac = [
            0x1f, 0x86, 0x98, 0x69, 0x0e, 0x02, 0xca, 0x16, 0x61, 0x85, 0x50, 0xef, 0x7f, 0x19,
            0xda, 0x8e, 0x94, 0x5b, 0x55, 0x5a,
        ];
        assert_eq!(truncate(&mac), 0x50ef7f19);
        assert_eq!(Digits::SIX.format(Digits::SIX.reduce(0x50ef7f19)), "872921");
    }

    // RFC 4226 测试向量
    #[test]
    fn test_rfc4226_test_vectors() {
        let generator = hotp(6);
        let secret = rfc_secret();

        let expected_codes = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];

        for (counter, expected) in expected_codes.iter().enumerate() {
            let code = generator.generate_code(counter as u64, &secret).unwrap();
            assert_eq!(&code, expected, "Failed at counter {}", counter);
            generator.validate(expected, counter as u64, &secret).unwrap();
        }
    }

    #[test]
    fn test_generate_ten_digits() {
        let code = hotp(10).generate_code(42, "JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(code, "0979090604");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = hotp(8);
        let secret = rfc_secret();
        assert_eq!(
            generator.generate_code(7, &secret).unwrap(),
            generator.generate_code(7, &secret).unwrap()
        );
    }

    #[test]
    fn test_generate_invalid_secret() {
        let err = hotp(6).generate_code(0, "not-base32!").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_validate_wrong_length() {
        let err = hotp(6).validate("12345", 0, &rfc_secret()).unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::CodeLengthMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_validate_length_checked_before_secret() {
        // 密钥无效，但长度检查在解码之前
        let err = hotp(6).validate("1234567", 0, "!!!").unwrap_err();
        assert!(err.is_length_mismatch());
    }

    #[test]
    fn test_validate_wrong_counter() {
        let err = hotp(6).validate("755224", 1, &rfc_secret()).unwrap_err();
        assert_eq!(err, Error::Validation(ValidationError::CodeInvalid));
    }

    #[test]
    fn test_new_rejects_too_many_digits() {
        let err = Hotp::new(HotpConfig::new().with_digits(11).with_issuer("x")).unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::DigitsTooLarge {
                max: 10,
                actual: 11,
            })
        );
    }

    #[test]
    fn test_max_digits_codes() {
        let generator = hotp(crate::otp::digits::MAX_DIGITS);
        let secret = rfc_secret();
        for counter in 0..10 {
            let code = generator.generate_code(counter, &secret).unwrap();
            assert_eq!(code.len(), 10);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
            generator.validate(&code, counter, &secret).unwrap();
        }
    }

    #[test]
    fn test_hotp_with_different_algorithms() {
        let secret = rfc_secret();
        for algorithm in Algorithm::ALL {
            let generator = Hotp::new(
                HotpConfig::new()
                    .with_algorithm(algorithm)
                    .with_issuer("cristalhq"),
            )
            .unwrap();

            let code = generator.generate_code(0, &secret).unwrap();
            assert_eq!(code.len(), 6);
            assert!(
                generator.validate(&code, 0, &secret).is_ok(),
                "Failed for algorithm {:?}",
                algorithm
            );
        }
    }

    #[test]
    fn test_generate_url() {
        let url = hotp(6).generate_url("alice@bob.com", b"SECRET_STRING");
        assert_eq!(
            url,
            "otpauth://hotp/cristalhq:alice@bob.com?algorithm=SHA1&digits=6&issuer=cristalhq&secret=KNCUGUSFKRPVGVCSJFHEO"
        );
    }

    #[test]
    fn test_from_key() {
        let key = Key::parse(
            "otpauth://hotp/ACME:alice?algorithm=SHA256&digits=8&counter=3&secret=AAAA",
        )
        .unwrap();
        let generator = Hotp::from_key(&key).unwrap();

        assert_eq!(generator.algorithm(), Algorithm::Sha256);
        assert_eq!(generator.digits(), Digits::EIGHT);
        assert_eq!(generator.issuer(), "ACME");
    }

    #[test]
    fn test_from_key_defaults() {
        let key = Key::parse("otpauth://hotp/ACME:alice?secret=AAAA").unwrap();
        let generator = Hotp::from_key(&key).unwrap();

        assert_eq!(generator.algorithm(), Algorithm::Sha1);
        assert_eq!(generator.digits(), Digits::SIX);
    }

    #[test]
    fn test_from_key_unknown_algorithm() {
        let key = Key::parse("otpauth://hotp/ACME:alice?algorithm=MD5&secret=AAAA").unwrap();
        let err = Hotp::from_key(&key).unwrap_err();
        assert_eq!(
            err,
            Error::Config(ConfigError::UnsupportedAlgorithm("MD5".to_string()))
        );
    }

    #[test]
    fn test_from_key_oversized_digits() {
        let key = Key::parse(
            "otpauth://hotp/ACME:alice?digits=4000000000&secret=JBSWY3DPEHPK3PXP",
        )
        .unwrap();
        assert_eq!(
            Hotp::from_key(&key).unwrap_err(),
            Error::Config(ConfigError::DigitsTooLarge {
                max: 10,
                actual: 4_000_000_000,
            })
        );
    }

    #[test]
    fn test_from_key_missing_issuer() {
        let key = Key::parse("otpauth://hotp/alice?secret=AAAA").unwrap();
        assert_eq!(
            Hotp::from_key(&key).unwrap_err(),
            Error::Config(ConfigError::EmptyIssuer)
        );
    }

    #[test]
    fn test_config_round_trip() {
        let config = HotpConfig::new()
            .with_algorithm(Algorithm::Sha512)
            .with_digits(8)
            .with_issuer("MyApp");
        let generator = Hotp::try_from(config.clone()).unwrap();
        assert_eq!(generator.config(), config);
    }

    #[test]
    fn test_config_serde() {
        let config: HotpConfig =
            serde_json::from_str(r#"{"algorithm":"SHA256","issuer":"MyApp"}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::Sha256);
        assert_eq!(config.digits, 6);
        assert_eq!(config.issuer, "MyApp");
    }
}
