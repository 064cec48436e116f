//! Base32 共享密钥编解码
//!
//! 调用方以 Base32 文本提供共享密钥。解码时容忍缺失的 `=` 填充：
//! 先补齐到 8 的倍数，再按 RFC 4648 严格解码；编码总是输出无填充的 Base32，便于嵌入 URI。

use data_encoding::{BASE32, BASE32_NOPAD};

use crate::error::{EncodingError, Result};

/// 解码 Base32 密钥
///
/// 非法字符、小写字母、补齐后长度不正确或填充位置错误都会返回
/// [`EncodingError::SecretInvalid`]。
///
/// # Example
///
/// ```rust
/// use otpauth::otp::secret::decode_secret;
///
/// assert_eq!(decode_secret("JBSWY3DPEHPK3PXP").unwrap(), b"Hello!\xde\xad\xbe\xef");
/// assert!(decode_secret("not base32!").is_err());
/// ```
pub fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let mut padded = String::with_capacity(secret.len() + 7);
    padded.push_str(secret);
    let rem = secret.len() % 8;
    if rem != 0 {
        padded.extend(std::iter::repeat_n('=', 8 - rem));
    }

    BASE32
        .decode(padded.as_bytes())
        .map_err(|e| EncodingError::SecretInvalid(e.to_string()).into())
}

/// 将原始字节编码为无填充的 Base32
pub fn encode_secret(bytes: &[u8]) -> String {
    BASE32_NOPAD.encode(bytes)
}

/// OTP 共享密钥
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    /// 原始密钥字节
    pub raw: Vec<u8>,

    /// 无填充 Base32 编码（用于显示和 URI）
    pub base32: String,
}

impl Secret {
    /// 推荐的密钥长度（字节），160 位
    pub const DEFAULT_LENGTH: usize = 20;

    /// 从原始字节创建
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let base32 = encode_secret(&bytes);
        Self { raw: bytes, base32 }
    }

    /// 从用户输入的 Base32 字符串创建
    ///
    /// 与 [`decode_secret`] 不同，这里会先去掉空格和连字符并转为大写，
    /// 以接受 `jbsw y3dp ehpk 3pxp` 这类手工录入的格式。
    pub fn from_base32(base32: &str) -> Result<Self> {
        let clean = base32.replace([' ', '-'], "").to_ascii_uppercase();
        let raw = decode_secret(&clean)?;
        Ok(Self::from_bytes(raw))
    }

    /// 生成指定长度的随机密钥
    #[cfg(feature = "gen-secret")]
    pub fn generate(length: usize) -> Result<Self> {
        let bytes = crate::random::generate_random_bytes(length)?;
        Ok(Self::from_bytes(bytes))
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Base32 文本
    pub fn as_base32(&self) -> &str {
        &self.base32
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("len", &self.raw.len())
            .finish_non_exhaustive()
    }
}
