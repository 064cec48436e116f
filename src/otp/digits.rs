//! 验证码位数与十进制格式化

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// 允许的最大位数
///
/// 截断后的值不超过 31 位 (2^31 - 1 = 2147483647)，10 位已能容纳全部取值。
pub const MAX_DIGITS: u32 = 10;

/// 验证码位数
///
/// 决定截断取模的模数 (10^digits) 以及左侧补零后的固定宽度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Digits(NonZeroU32);

impl Digits {
    /// 6 位（最常见）
    pub const SIX: Digits = Digits(NonZeroU32::new(6).unwrap());

    /// 8 位
    pub const EIGHT: Digits = Digits(NonZeroU32::new(8).unwrap());

    /// 创建位数
    ///
    /// 0 位返回 [`ConfigError::NoDigits`]，超过 [`MAX_DIGITS`] 返回 [`ConfigError::DigitsTooLarge`]。
    pub fn new(digits: u32) -> Result<Self> {
        if digits > MAX_DIGITS {
            return Err(ConfigError::DigitsTooLarge {
                max: MAX_DIGITS,
                actual: digits,
            }
            .into());
        }
        NonZeroU32::new(digits)
            .map(Digits)
            .ok_or_else(|| ConfigError::NoDigits.into())
    }

    /// 验证码长度
    pub fn length(&self) -> usize {
        self.0.get() as usize
    }

    /// 取模用的模数 10^digits
    pub fn modulus(&self) -> u64 {
        10u64.pow(self.0.get())
    }

    /// 将截断值约简到 [0, 10^digits)
    pub fn reduce(&self, value: u64) -> u64 {
        value % self.modulus()
    }

    /// 格式化为固定宽度、左侧补零的十进制字符串
    pub fn format(&self, n: u64) -> String {
        format!("{:0width$}", n, width = self.length())
    }
}

impl Default for Digits {
    fn default() -> Self {
        Digits::SIX
    }
}

impl TryFrom<u32> for Digits {
    type Error = crate::error::Error;

    fn try_from(value: u32) -> Result<Self> {
        Digits::new(value)
    }
}

impl From<Digits> for u32 {
    fn from(digits: Digits) -> Self {
        digits.0.get()
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
