//! Startup flags.

use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "🍅 pomocli - a terminal Pomodoro timer with a session queue")]
pub struct Args {
    /// Initial session length; the timer starts right away when given
    #[arg(value_name = "MINUTES", value_parser = parse_amount)]
    pub length: Option<Amount>,
    /// Session length
    #[arg(short = 'S', long, value_parser = parse_amount)]
    pub session: Option<Amount>,
    /// Break length
    #[arg(short = 'b', long = "break", value_parser = parse_amount)]
    pub break_len: Option<Amount>,
    /// Read bare numbers as minutes (the default)
    #[arg(short = 'm', long = "minutes")]
    pub in_minutes: bool,
    /// Read bare numbers as seconds
    #[arg(short = 's', long = "seconds", conflicts_with = "in_minutes")]
    pub in_seconds: bool,
    #[arg(long)]
    pub no_sound: bool,
}

/// A duration as written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// Plain number, unit chosen by `-m`/`-s`.
    Bare(u32),
    /// Number with explicit unit suffixes, already in seconds.
    Secs(u32),
}

/// Accepts `25`, `90s`, `25m`, `1h30m`.
pub fn parse_amount(s: &str) -> Result<Amount, String> {
    let s = s.trim().to_lowercase();
    if let Ok(n) = s.parse::<u32>() {
        return if n > 0 { Ok(Amount::Bare(n)) } else { Err("Duration must be > 0".into()) };
    }

    let mut total: u32 = 0;
    let mut num = String::new();
    for c in s.chars() {
        let factor = match c {
            '0'..='9' => {
                num.push(c);
                continue;
            }
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(format!("Invalid duration '{s}'")),
        };
        let n: u32 = num.parse().map_err(|_| format!("Invalid duration '{s}'"))?;
        total = n
            .checked_mul(factor)
            .and_then(|v| total.checked_add(v))
            .ok_or("Duration is too long")?;
        num.clear();
    }
    if !num.is_empty() {
        return Err(format!("Missing unit after '{num}'"));
    }

    if total > 0 { Ok(Amount::Secs(total)) } else { Err("Duration must be > 0".into()) }
}

/// Startup durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Durations {
    pub session_secs: Option<u32>,
    pub break_secs: Option<u32>,
    /// Start counting immediately instead of waiting for `start`.
    pub autostart: bool,
}

impl Args {
    pub fn durations(&self) -> Result<Durations, String> {
        let to_secs = |a: Option<Amount>| -> Result<Option<u32>, String> {
            match a {
                None => Ok(None),
                Some(Amount::Secs(s)) => Ok(Some(s)),
                Some(Amount::Bare(n)) if self.in_seconds => Ok(Some(n)),
                Some(Amount::Bare(n)) => n
                    .checked_mul(60)
                    .map(Some)
                    .ok_or_else(|| "Please enter a valid number of minutes".to_string()),
            }
        };
        let positional = to_secs(self.length)?;
        Ok(Durations {
            session_secs: positional.or(to_secs(self.session)?),
            break_secs: to_secs(self.break_len)?,
            autostart: positional.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("pomocli").chain(args.iter().copied()))
    }

    #[test]
    fn amounts() {
        assert_eq!(parse_amount("25"), Ok(Amount::Bare(25)));
        assert_eq!(parse_amount("90s"), Ok(Amount::Secs(90)));
        assert_eq!(parse_amount("1h30m"), Ok(Amount::Secs(5400)));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("ten").is_err());
        assert!(parse_amount("5x").is_err());
        assert!(parse_amount("-3").is_err());
    }

    #[test]
    fn positional_minutes_autostart() {
        let d = parse(&["30"]).unwrap().durations().unwrap();
        assert_eq!(d.session_secs, Some(1800));
        assert!(d.autostart);
    }

    #[test]
    fn flags_with_seconds_unit() {
        let d = parse(&["-S", "90", "-b", "30", "-s"]).unwrap().durations().unwrap();
        assert_eq!(d.session_secs, Some(90));
        assert_eq!(d.break_secs, Some(30));
        assert!(!d.autostart);
    }

    #[test]
    fn explicit_suffix_wins_over_unit_flag() {
        let d = parse(&["--break", "2m", "--seconds"]).unwrap().durations().unwrap();
        assert_eq!(d.break_secs, Some(120));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(parse(&["-S", "abc"]).is_err());
        assert!(parse(&["--break"]).is_err());
        assert!(parse(&["-m", "-s"]).is_err());
    }

    #[test]
    fn huge_minutes_overflow_is_an_error() {
        let args = parse(&["-S", "4294967295"]).unwrap();
        assert!(args.durations().is_err());
    }
}
