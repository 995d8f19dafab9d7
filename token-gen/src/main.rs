use anyhow::{Context, Result, bail};
use clap::Parser;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

/// Mint an HS256 access token the booking API accepts, for local testing.
///
/// - claims: sub, role, email (optional), iat, exp
/// - `--expired` backdates the token so it fails verification
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Subject (user id, UUID). Default: random UUID v4.
    #[arg(long)]
    sub: Option<Uuid>,

    /// Role claim, e.g. `admin`
    #[arg(long, default_value = "user")]
    role: String,

    #[arg(long)]
    email: Option<String>,

    /// Token lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    ttl_seconds: i64,

    /// Issue a token that expired `ttl_seconds` ago
    #[arg(long, default_value_t = false)]
    expired: bool,

    /// Signing secret (must match the server's JWT_SECRET)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

// 10 年
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// (iat, exp) を返す。expired なら窓ごと ttl 分だけ過去にずらす
fn token_window(now: i64, ttl_seconds: i64, expired: bool) -> Result<(i64, i64)> {
    if ttl_seconds <= 0 {
        bail!("--ttl-seconds must be positive");
    }
    if ttl_seconds > MAX_TTL_SECONDS {
        bail!("--ttl-seconds must be at most {MAX_TTL_SECONDS}");
    }
    let window = if expired {
        ttl_seconds
            .checked_mul(2)
            .and_then(|back| now.checked_sub(back))
            .zip(now.checked_sub(ttl_seconds))
    } else {
        now.checked_add(ttl_seconds).map(|exp| (now, exp))
    };
    window.context("token lifetime overflows the timestamp range")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let sub = args.sub.unwrap_or_else(Uuid::new_v4);
    let now = chrono::Utc::now().timestamp();
    let (iat, exp) = token_window(now, args.ttl_seconds, args.expired)?;

    let mut claims = json!({
        "sub": sub,
        "role": args.role,
        "iat": iat,
        "exp": exp,
    });
    if let Some(email) = &args.email {
        claims["email"] = json!(email);
    }

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());
    let token = jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(args.secret.as_bytes()))
        .context("signing token")?;

    if args.quiet {
        println!("{token}");
        return Ok(());
    }

    println!("sub:   {sub}");
    println!("role:  {}", args.role);
    println!("exp:   {exp}{}", if args.expired { " (expired)" } else { "" });
    println!();
    println!("Authorization: Bearer {token}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_window_starts_now() {
        assert_eq!(token_window(1_000, 60, false).unwrap(), (1_000, 1_060));
    }

    #[test]
    fn expired_window_ends_ttl_ago() {
        assert_eq!(token_window(1_000, 60, true).unwrap(), (880, 940));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        assert!(token_window(1_000, 0, false).is_err());
        assert!(token_window(1_000, -5, true).is_err());
    }

    #[test]
    fn huge_ttl_is_rejected_instead_of_overflowing() {
        assert!(token_window(1_000, i64::MAX, true).is_err());
        assert!(token_window(1_000, i64::MAX / 2 + 1, true).is_err());
        assert!(token_window(1_000, MAX_TTL_SECONDS + 1, false).is_err());
    }

    #[test]
    fn overflowing_timestamp_is_an_error() {
        let err = token_window(i64::MIN + 10, MAX_TTL_SECONDS, true).unwrap_err();
        assert!(err.to_string().contains("overflows"), "{err}");
        assert!(token_window(i64::MAX - 10, 60, false).is_err());
    }

    #[test]
    fn cli_parses_defaults() {
        let args = Args::try_parse_from(["token-gen", "--secret", "s"]).unwrap();
        assert_eq!(args.ttl_seconds, 3600);
        assert_eq!(args.role, "user");
        assert!(!args.expired);
    }
}
