//! OTP 设置示例
//!
//! 展示如何使用 otpauth 为用户开启 TOTP/HOTP：生成密钥、生成 otpauth URI、
//! 校验用户输入，以及由调用方负责保存的计数器与防重放状态。
//!
//! 运行: cargo run --example otp_setup

use std::collections::HashMap;

use chrono::Utc;
use otpauth::{Hotp, HotpConfig, Key, Secret, Totp, TotpConfig};

/// 用户的 OTP 状态（真实系统中应持久化保存）
#[derive(Default)]
struct UserOtpState {
    totp_secret: Option<Secret>,
    hotp_secret: Option<Secret>,
    hotp_counter: u64,
    /// 最近一次接受的 TOTP 计数器，用于拒绝重放
    last_totp_counter: Option<u64>,
}

/// OTP 服务
struct OtpService {
    totp: Totp,
    hotp: Hotp,
    users: HashMap<String, UserOtpState>,
}

impl OtpService {
    fn new() -> otpauth::Result<Self> {
        Ok(Self {
            totp: Totp::new(TotpConfig::google_authenticator("otpauth demo"))?,
            hotp: Hotp::new(HotpConfig::new().with_issuer("otpauth demo"))?,
            users: HashMap::new(),
        })
    }

    /// 启用 TOTP，返回供二维码使用的 URI
    fn enable_totp(&mut self, user: &str) -> otpauth::Result<String> {
        let secret = Secret::generate(Secret::DEFAULT_LENGTH)?;
        let uri = self.totp.generate_url(user, secret.as_bytes());

        self.users.entry(user.to_string()).or_default().totp_secret = Some(secret);
        Ok(uri)
    }

    /// 启用 HOTP
    fn enable_hotp(&mut self, user: &str) -> otpauth::Result<String> {
        let secret = Secret::generate(Secret::DEFAULT_LENGTH)?;
        let uri = self.hotp.generate_url(user, secret.as_bytes());

        let state = self.users.entry(user.to_string()).or_default();
        state.hotp_secret = Some(secret);
        state.hotp_counter = 0;
        Ok(uri)
    }

    /// 校验 TOTP，同一时间步的码只接受一次
    fn verify_totp(&mut self, user: &str, code: &str) -> Result<(), String> {
        let state = self.users.get_mut(user).ok_or("unknown user")?;
        let secret = state.totp_secret.as_ref().ok_or("totp not enabled")?;

        let now = Utc::now();
        let offset = self
            .totp
            .validate_with_step(code, now, secret.as_base32())
            .map_err(|e| e.to_string())?;

        let counter = self.totp.counter_at(now).saturating_add_signed(offset);
        if state.last_totp_counter.is_some_and(|last| counter <= last) {
            return Err("code already used".to_string());
        }
        state.last_totp_counter = Some(counter);
        Ok(())
    }

    /// 校验 HOTP，成功后推进计数器
    fn verify_hotp(&mut self, user: &str, code: &str) -> Result<(), String> {
        let state = self.users.get_mut(user).ok_or("unknown user")?;
        let secret = state.hotp_secret.as_ref().ok_or("hotp not enabled")?;

        self.hotp
            .validate(code, state.hotp_counter, secret.as_base32())
            .map_err(|e| e.to_string())?;
        state.hotp_counter += 1;
        Ok(())
    }
}

fn main() -> otpauth::Result<()> {
    let mut service = OtpService::new()?;

    println!("=== TOTP ===");
    let uri = service.enable_totp("alice@example.com")?;
    println!("otpauth URI: {}", uri);

    // 模拟认证器应用：扫描 URI 并生成当前验证码
    let key = Key::parse(&uri)?;
    let authenticator = Totp::from_key(&key, 1)?;
    let code = authenticator.generate_code_now(key.secret())?;
    println!("当前验证码: {} (剩余 {} 秒)", code, authenticator.time_remaining());

    println!("首次校验: {:?}", service.verify_totp("alice@example.com", &code));
    println!("重放校验: {:?}", service.verify_totp("alice@example.com", &code));

    println!();
    println!("=== HOTP ===");
    let uri = service.enable_hotp("bob@example.com")?;
    println!("otpauth URI: {}", uri);

    let key = Key::parse(&uri)?;
    let token = Hotp::from_key(&key)?;
    for counter in 0..3 {
        let code = token.generate_code(counter, key.secret())?;
        println!(
            "计数器 {} 验证码 {}: {:?}",
            counter,
            code,
            service.verify_hotp("bob@example.com", &code)
        );
    }

    Ok(())
}
