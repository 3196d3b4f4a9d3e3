//! Numeric extractors: runtimes, money amounts and award counts

use regex::Regex;
use std::sync::LazyLock;

static RUNTIME_HOURS_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*hours?\s*(\d+)\s*minutes?\b").expect("runtime regex should compile")
});
static RUNTIME_HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*hours?\b").expect("runtime regex should compile")
});
static RUNTIME_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*minutes?\b").expect("runtime regex should compile")
});
static RUNTIME_COMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*h\s*(\d+)\s*m").expect("runtime regex should compile")
});
static RUNTIME_COMPACT_HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*h\b").expect("runtime regex should compile")
});
static RUNTIME_COMPACT_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*m\b").expect("runtime regex should compile")
});
static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*PT(?:(\d+)H)?(?:(\d+)M)?").expect("duration regex should compile")
});

static MONEY_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?(\d[\d,]*)(\.\d+)?(\s*(?:million|thousand|billion)\b)?")
        .expect("money regex should compile")
});
static MONEY_MILLION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?(\d[\d,]*)(?:\.(\d+))?\s*million\b").expect("money regex should compile")
});
static MONEY_THOUSAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?(\d[\d,]*)(?:\.(\d+))?\s*thousand\b")
        .expect("money regex should compile")
});
static MONEY_BILLION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?(\d[\d,]*)(?:\.(\d+))?\s*billion\b").expect("money regex should compile")
});

static OSCARS_WON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwon\s+(\d+)\s+oscars?\b").expect("oscar regex should compile")
});
static ACADEMY_AWARD_WINS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+wins?\b.*?academy awards?").expect("oscar regex should compile")
});
static TOTAL_WINS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+wins?\b").expect("wins regex should compile"));
static TOTAL_NOMINATIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+nominations?\b").expect("nominations regex should compile")
});

/// Converts a display runtime to total minutes
///
/// Patterns are tried in order: "H hours M minutes", "H hours", "M minutes",
/// "HhMm", then the lone compact forms "Hh" and "Mm". The first pattern that
/// matches decides the result.
///
/// # Example
///
/// ```
/// use reel_ripple::extract::extract_runtime_minutes;
///
/// assert_eq!(extract_runtime_minutes("2 hours 22 minutes"), Some(142));
/// assert_eq!(extract_runtime_minutes("2h 22m"), Some(142));
/// assert_eq!(extract_runtime_minutes("no runtime info"), None);
/// ```
pub fn extract_runtime_minutes(text: &str) -> Option<u32> {
    if let Some(caps) = RUNTIME_HOURS_MINUTES.captures(text) {
        return hours_and_minutes(caps.get(1)?.as_str(), caps.get(2)?.as_str());
    }
    if let Some(caps) = RUNTIME_HOURS.captures(text) {
        return caps.get(1)?.as_str().parse::<u32>().ok()?.checked_mul(60);
    }
    if let Some(caps) = RUNTIME_MINUTES.captures(text) {
        return caps.get(1)?.as_str().parse().ok();
    }
    if let Some(caps) = RUNTIME_COMPACT.captures(text) {
        return hours_and_minutes(caps.get(1)?.as_str(), caps.get(2)?.as_str());
    }
    if let Some(caps) = RUNTIME_COMPACT_HOURS.captures(text) {
        return caps.get(1)?.as_str().parse::<u32>().ok()?.checked_mul(60);
    }
    RUNTIME_COMPACT_MINUTES
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

fn hours_and_minutes(hours: &str, minutes: &str) -> Option<u32> {
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Converts an ISO-8601 duration such as `PT2H22M` to minutes
pub fn extract_iso_duration_minutes(text: &str) -> Option<u32> {
    let caps = ISO_DURATION.captures(text)?;
    let hours = caps.get(1).map(|m| m.as_str());
    let minutes = caps.get(2).map(|m| m.as_str());
    match (hours, minutes) {
        (None, None) => None,
        (h, m) => hours_and_minutes(h.unwrap_or("0"), m.unwrap_or("0")),
    }
}

/// Renders minutes as the compact display form (`2h 22m`, `2h`, `45m`)
pub fn format_runtime(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Extracts a dollar amount as a whole number of dollars
///
/// Tries a literal `$1,234,567` amount first, then `$X million`,
/// `$X thousand` and `$X billion`. Amounts in other currencies are absent.
///
/// # Example
///
/// ```
/// use reel_ripple::extract::extract_money;
///
/// assert_eq!(extract_money("$1,234,567"), Some(1_234_567));
/// assert_eq!(extract_money("$1.2 million"), Some(1_200_000));
/// assert_eq!(extract_money("$500 thousand"), Some(500_000));
/// ```
pub fn extract_money(text: &str) -> Option<u64> {
    // A literal amount must not carry a magnitude word
    let literal = MONEY_LITERAL
        .captures_iter(text)
        .find(|caps| caps.get(3).is_none())
        .and_then(|caps| parse_grouped_digits(caps.get(1)?.as_str()));
    if literal.is_some() {
        return literal;
    }

    for (pattern, multiplier) in [
        (&*MONEY_MILLION, 1_000_000u64),
        (&*MONEY_THOUSAND, 1_000),
        (&*MONEY_BILLION, 1_000_000_000),
    ] {
        if let Some(caps) = pattern.captures(text) {
            let whole = caps.get(1)?.as_str();
            let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            return scale_decimal(whole, fraction, multiplier);
        }
    }

    None
}

fn parse_grouped_digits(digits: &str) -> Option<u64> {
    digits.replace(',', "").parse().ok()
}

/// Computes `whole.fraction * multiplier` without floating point rounding
fn scale_decimal(whole: &str, fraction: &str, multiplier: u64) -> Option<u64> {
    let whole = parse_grouped_digits(whole)?;
    let mut total = whole.checked_mul(multiplier)?;

    let mut place = multiplier;
    for digit in fraction.chars() {
        place /= 10;
        if place == 0 {
            break;
        }
        total = total.checked_add(u64::from(digit.to_digit(10)?) * place)?;
    }

    Some(total)
}

/// Counts Oscar wins mentioned in an awards summary
///
/// Tries "Won N Oscar(s)" then "N win(s) ... Academy Award". Returns 0 when
/// neither matches: zero wins is a real answer, not a missing one.
pub fn extract_oscar_count(text: &str) -> u32 {
    OSCARS_WON
        .captures(text)
        .or_else(|| ACADEMY_AWARD_WINS.captures(text))
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
        .unwrap_or(0)
}

/// Extracts total wins and nominations from text like "82 wins & 60 nominations"
pub fn extract_award_totals(text: &str) -> (Option<u32>, Option<u32>) {
    let wins = TOTAL_WINS
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok());
    let nominations = TOTAL_NOMINATIONS
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok());
    (wins, nominations)
}
