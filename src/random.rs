//! 安全随机数与常量时间比较模块
//!
//! 提供密码学安全的随机字节生成（用于生成 OTP 共享密钥），
//! 以及用于验证码比对的常量时间比较。

use subtle::ConstantTimeEq;

#[cfg(feature = "gen-secret")]
use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use otpauth::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(20).unwrap();
/// assert_eq!(bytes.len(), 20);
/// ```
#[cfg(feature = "gen-secret")]
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    use rand::{TryRngCore, rngs::OsRng};

    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 常量时间比较两个字节切片
///
/// 比较耗时只取决于长度，不取决于第一个不同字节的位置，用于防止时序攻击。
///
/// # Example
///
/// ```rust
/// use otpauth::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"755224", b"755224"));
/// assert!(!constant_time_compare(b"755224", b"755225"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
