//! TOTP (基于时间的一次性密码) 实现模块
//!
//! 提供符合 RFC 6238 的 TOTP 生成与验证，兼容 Google Authenticator、Authy 等应用。
//!
//! ## 特性
//!
//! - 支持自定义时间步长和位数
//! - 验证时容忍前后 `skew` 个时间步的时钟偏差
//! - 生成 otpauth:// URI
//!
//! TOTP 内部持有一个 [`Hotp`]，计数器由时间推导后交给 HOTP 计算。
//!
//! ## 示例
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use otpauth::otp::totp::{Totp, TotpConfig};
//!
//! let totp = Totp::new(TotpConfig::new().with_issuer("cristalhq").with_digits(8)).unwrap();
//!
//! let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
//! let at = Utc.timestamp_opt(59, 0).unwrap();
//!
//! let code = totp.generate_code(secret, at).unwrap();
//! assert_eq!(code, "94287082");
//!
//! totp.validate(&code, at, secret).unwrap();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::otp::algorithm::Algorithm;
use crate::otp::digits::Digits;
use crate::otp::hotp::{self, Hotp, HotpConfig};
use crate::otp::key::{self, DEFAULT_PERIOD, Key};
use crate::otp::secret::decode_secret;

/// 允许的最大时间偏差窗口（前后各多少个时间步）
///
/// 每个候选时间步都要计算一次 HMAC，上限约束单次验证的开销。
pub const MAX_SKEW: u32 = 10;

/// TOTP 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// 哈希算法
    pub algorithm: Algorithm,

    /// 验证码位数，默认 6 位
    pub digits: u32,

    /// 签发者名称，不能为空
    pub issuer: String,

    /// 时间步长（秒），默认 30 秒
    pub period: u64,

    /// 允许的时间偏差窗口（前后各多少个时间步）
    /// 默认为 1，即允许前后各一个时间步的误差；0 表示只接受当前时间步
    pub skew: u32,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha1,
            digits: 6,
            issuer: String::new(),
            period: DEFAULT_PERIOD,
            skew: 1,
        }
    }
}

impl TotpConfig {
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

    /// 设置时间步长
    pub fn with_period(mut self, seconds: u64) -> Self {
        self.period = seconds;
        self
    }

    /// 设置时间偏差窗口
    pub fn with_skew(mut self, skew: u32) -> Self {
        self.skew = skew;
        self
    }

    /// 创建 Google Authenticator 兼容配置
    pub fn google_authenticator(issuer: impl Into<String>) -> Self {
        Self::default().with_issuer(issuer)
    }

    fn hotp_config(&self) -> HotpConfig {
        HotpConfig {
            algorithm: self.algorithm,
            digits: self.digits,
            issuer: self.issuer.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.period == 0 {
            return Err(ConfigError::PeriodInvalid.into());
        }
        if self.skew > MAX_SKEW {
            return Err(ConfigError::SkewInvalid {
                max: MAX_SKEW,
                actual: self.skew,
            }
            .into());
        }
        Ok(())
    }
}

/// TOTP 生成器与验证器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totp {
    hotp: Hotp,
    period: u64,
    skew: u32,
}

impl Totp {
    /// 根据配置创建 TOTP
    ///
    /// 除 HOTP 的构造错误外，时间步长为 0 返回 [`ConfigError::PeriodInvalid`]，
    /// `skew` 超过 [`MAX_SKEW`] 返回 [`ConfigError::SkewInvalid`]。
    pub fn new(config: TotpConfig) -> Result<Self> {
        let hotp = Hotp::new(config.hotp_config())?;
        config.validate().inspect_err(|err| {
            tracing::debug!(error = %err, "rejected TOTP config");
        })?;

        Ok(Self {
            hotp,
            period: config.period,
            skew: config.skew,
        })
    }

    /// 根据解析出的 otpauth URI 创建 TOTP
    ///
    /// URI 不携带时间偏差窗口，由调用方指定。
    pub fn from_key(key: &Key, skew: u32) -> Result<Self> {
        let hotp = hotp::config_from_key(key)?;
        Self::new(TotpConfig {
            algorithm: hotp.algorithm,
            digits: hotp.digits,
            issuer: hotp.issuer,
            period: key.period(),
            skew,
        })
    }

    /// 指定时间对应的计数器：floor(unix 秒 / period)
    ///
    /// 早于 Unix 纪元的时间按计数器 0 处理。
    pub fn counter_at(&self, at: DateTime<Utc>) -> u64 {
        u64::try_from(at.timestamp()).map_or(0, |secs| secs / self.period)
    }

    /// 生成指定时间的验证码
    pub fn generate_code(&self, secret: &str, at: DateTime<Utc>) -> Result<String> {
        self.hotp.generate_code(self.counter_at(at), secret)
    }

    /// 生成当前时间的验证码
    pub fn generate_code_now(&self, secret: &str) -> Result<String> {
        self.generate_code(secret, Utc::now())
    }

    /// 验证指定时间的验证码
    ///
    /// 依次尝试当前时间步、+1、-1、+2、-2 …… 直到 ±skew，任一匹配即成功。
    pub fn validate(&self, passcode: &str, at: DateTime<Utc>, secret: &str) -> Result<()> {
        self.validate_with_step(passcode, at, secret).map(|_| ())
    }

    /// 验证当前时间的验证码
    pub fn validate_now(&self, passcode: &str, secret: &str) -> Result<()> {
        self.validate(passcode, Utc::now(), secret)
    }

    /// 验证验证码并返回匹配的时间步偏移量
    ///
    /// 0 表示当前时间步，负数表示过去，正数表示未来；调用方可据此估计客户端时钟漂移。
    pub fn validate_with_step(
        &self,
        passcode: &str,
        at: DateTime<Utc>,
        secret: &str,
    ) -> Result<i64> {
        self.hotp.check_length(passcode)?;

        let key = decode_secret(secret)?;
        let counter = self.counter_at(at);

        for (check_counter, offset) in candidates(counter, self.skew) {
            if self.hotp.matches(&key, passcode, check_counter)? {
                tracing::trace!(offset, "totp code accepted");
                return Ok(offset);
            }
        }

        tracing::trace!(counter, skew = self.skew, "totp code mismatch");
        Err(ValidationError::CodeInvalid.into())
    }

    /// 生成 otpauth://totp URI
    pub fn generate_url(&self, account: &str, secret: &[u8]) -> String {
        let mut params = self.hotp.url_params(secret);
        params.push(("period", self.period.to_string()));
        key::build_uri("totp", self.hotp.issuer(), account, &params)
    }

    /// 指定时间下当前验证码的剩余有效时间（秒）
    pub fn time_remaining_at(&self, at: DateTime<Utc>) -> u64 {
        let secs = u64::try_from(at.timestamp()).unwrap_or(0);
        self.period - secs % self.period
    }

    /// 当前验证码的剩余有效时间（秒）
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining_at(Utc::now())
    }

    /// 内部的 HOTP
    pub fn hotp(&self) -> &Hotp {
        &self.hotp
    }

    /// 时间步长（秒）
    pub fn period(&self) -> u64 {
        self.period
    }

    /// 时间偏差窗口
    pub fn skew(&self) -> u32 {
        self.skew
    }

    /// 哈希算法
    pub fn algorithm(&self) -> Algorithm {
        self.hotp.algorithm()
    }

    /// 验证码位数
    pub fn digits(&self) -> Digits {
        self.hotp.digits()
    }

    /// 签发者
    pub fn issuer(&self) -> &str {
        self.hotp.issuer()
    }

    /// 还原为配置
    pub fn config(&self) -> TotpConfig {
        let hotp = self.hotp.config();
        TotpConfig {
            algorithm: hotp.algorithm,
            digits: hotp.digits,
            issuer: hotp.issuer,
            period: self.period,
            skew: self.skew,
        }
    }
}

impl TryFrom<TotpConfig> for Totp {
    type Error = Error;

    fn try_from(config: TotpConfig) -> Result<Self> {
        Totp::new(config)
    }
}

/// 候选计数器及其偏移量：base, +1, -1, +2, -2, …, ±skew
///
/// 会越过 0 或 `u64::MAX` 的候选直接跳过。
fn candidates(counter: u64, skew: u32) -> impl Iterator<Item = (u64, i64)> {
    let around = (1..=u64::from(skew)).flat_map(move |i| {
        let ahead = counter.checked_add(i).map(|c| (c, i as i64));
        let behind = counter.checked_sub(i).map(|c| (c, -(i as i64)));
        [ahead, behind].into_iter().flatten()
    });
    std::iter::once((counter, 0)).chain(around)
}
