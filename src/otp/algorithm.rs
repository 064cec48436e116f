//! OTP 哈希算法选择
//!
//! 将算法枚举映射到对应的 HMAC 原语（HMAC-SHA1 / HMAC-SHA256 / HMAC-SHA512）。
//! `Algorithm` 是封闭枚举，不存在无效取值，因此名称渲染是全函数；
//! “未知算法”只会出现在解析阶段，以 [`ConfigError::UnsupportedAlgorithm`] 的形式返回。

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::{ConfigError, CryptoError, Error, Result};

/// OTP 哈希算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    /// SHA-1（默认，最广泛支持）
    #[default]
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl Algorithm {
    /// 所有支持的算法
    pub const ALL: [Algorithm; 3] = [Algorithm::Sha1, Algorithm::Sha256, Algorithm::Sha512];

    /// 获取算法名称（用于 otpauth URI）
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha512 => "SHA512",
        }
    }

    /// HMAC 输出长度（字节）
    pub fn output_len(&self) -> usize {
        match self {
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
            Algorithm::Sha512 => 64,
        }
    }

    /// 计算 HMAC(key, message)
    pub fn hmac(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        match self {
            Algorithm::Sha1 => mac_bytes::<Hmac<Sha1>>(key, message),
            Algorithm::Sha256 => mac_bytes::<Hmac<Sha256>>(key, message),
            Algorithm::Sha512 => mac_bytes::<Hmac<Sha512>>(key, message),
        }
    }
}

fn mac_bytes<M: Mac + hmac::digest::KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| Error::Crypto(CryptoError::InvalidKey(e.to_string())))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// 解析算法名称，不区分大小写，允许 `SHA-256` 这样的连字符写法
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace('-', "").to_ascii_uppercase();
        match normalized.as_str() {
            "SHA1" => Ok(Algorithm::Sha1),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA512" => Ok(Algorithm::Sha512),
            _ => Err(ConfigError::UnsupportedAlgorithm(s.to_string()).into()),
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = Error;

    /// 按数值编号转换：1 = SHA1，2 = SHA256，3 = SHA512；0 表示未知
    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Algorithm::Sha1),
            2 => Ok(Algorithm::Sha256),
            3 => Ok(Algorithm::Sha512),
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string()).into()),
        }
    }
}
