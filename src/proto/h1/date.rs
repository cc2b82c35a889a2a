//! `Expires` header: RFC 1123 dates decoded straight to seconds since
//! the Unix epoch. The two other date formats HTTP theoretically allows
//! (RFC 850, asctime) are rejected.

use bytes::Bytes;

use super::field::{eol, Field, FieldResult};
use super::parse::{Inner, Parser};
use super::scan::{self, Reject, Scanned};

const SEC24H: u32 = 24 * 3600;

// Seconds before each month in a non-leap year.
const SB_FEB: u32 = 31 * SEC24H;
const SB_MAR: u32 = SB_FEB + 28 * SEC24H;
const SB_APR: u32 = SB_MAR + 31 * SEC24H;
const SB_MAY: u32 = SB_APR + 30 * SEC24H;
const SB_JUN: u32 = SB_MAY + 31 * SEC24H;
const SB_JUL: u32 = SB_JUN + 30 * SEC24H;
const SB_AUG: u32 = SB_JUL + 31 * SEC24H;
const SB_SEP: u32 = SB_AUG + 31 * SEC24H;
const SB_OCT: u32 = SB_SEP + 30 * SEC24H;
const SB_NOV: u32 = SB_OCT + 31 * SEC24H;
const SB_DEC: u32 = SB_NOV + 30 * SEC24H;

/// Days before 1970-01-01, leap years included.
const EPOCH_DAYS: u64 = 1970 * 365 + 1970 / 4 - 1970 / 100 + 1970 / 400;

/// Folds a 4-digit year into `day_sec` (seconds contributed by the day
/// and month). `past_feb` applies the leap-day correction only when the
/// date lies after February.
fn year_day_secs(year: u32, day_sec: u32, past_feb: bool) -> Option<u32> {
    let days = u64::from(year) * 365 + u64::from(year / 4) - u64::from(year / 100)
        + u64::from(year / 400);
    let mut day_sec = u64::from(day_sec);
    if year % 4 == 0 && !(year % 100 == 0 && year % 400 != 0) && past_feb {
        day_sec += u64::from(SEC24H);
    }
    if days < EPOCH_DAYS {
        return None;
    }
    let total = (days - EPOCH_DAYS) * u64::from(SEC24H) + day_sec;
    if total > u64::from(u32::MAX) {
        return None;
    }
    Some(total as u32)
}

/// `Expires` value sub-parser: `Day "," SP 2DIGIT SP month SP 4DIGIT SP
/// HH ":" MM ":" SS SP "GMT"`. The weekday is skipped as redundant; the
/// ` GMT` tail is skipped through a counted state so a buffer boundary
/// inside it resumes cleanly.
pub(crate) fn expires(parser: &mut Parser, buf: &Bytes, at: usize, out: &mut u32) -> FieldResult {
    let mut i = at;
    loop {
        match parser.inner {
            Inner::Expires => match buf[i..].iter().position(|&b| b == b' ') {
                Some(k) => {
                    i += k + 1;
                    i_enter!(parser, buf, i, Inner::ExpDate);
                }
                None => return Ok(Field::Postpone),
            },
            Inner::ExpDate => {
                if parser.carry.is_empty() && !buf[i].is_ascii_digit() {
                    return Err(Reject::Neq);
                }
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::ws_delim)? {
                    Scanned::Int { consumed, digits } => {
                        if digits != 2 || acc < 1 {
                            return Err(Reject::BadLen);
                        }
                        *out = (acc - 1) * SEC24H;
                        parser.exp_past_feb = false;
                        // Day and the following SP.
                        i += consumed + 1;
                        i_enter!(parser, buf, i, Inner::ExpMonth);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ExpMonth => {
                let first = parser.carry.first().unwrap_or(buf[i]);
                match first {
                    b'A' => {
                        try_str!(parser, buf, i, b"Apr", {
                            *out += SB_APR;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Aug", {
                            *out += SB_AUG;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        return Err(Reject::Neq);
                    }
                    b'J' => {
                        try_str!(parser, buf, i, b"Jan", {
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Jun", {
                            *out += SB_JUN;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Jul", {
                            *out += SB_JUL;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        return Err(Reject::Neq);
                    }
                    b'M' => {
                        try_str!(parser, buf, i, b"Mar", {
                            *out += SB_MAR;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"May", {
                            *out += SB_MAY;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        return Err(Reject::Neq);
                    }
                    _ => {
                        try_str!(parser, buf, i, b"Feb", {
                            *out += SB_FEB;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Sep", {
                            *out += SB_SEP;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Oct", {
                            *out += SB_OCT;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Nov", {
                            *out += SB_NOV;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        try_str!(parser, buf, i, b"Dec", {
                            *out += SB_DEC;
                            parser.exp_past_feb = true;
                            i_enter!(parser, buf, i, Inner::ExpYearSp);
                        });
                        return Err(Reject::Neq);
                    }
                }
            }
            Inner::ExpYearSp => {
                if buf[i] == b' ' {
                    i_move!(parser, buf, i, Inner::ExpYear);
                }
                return Err(Reject::Neq);
            }
            Inner::ExpYear => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::ws_delim)? {
                    Scanned::Int { consumed, digits } => {
                        if digits != 4 {
                            return Err(Reject::BadLen);
                        }
                        match year_day_secs(acc, *out, parser.exp_past_feb) {
                            Some(n) => *out = n,
                            None => return Err(Reject::Neq),
                        }
                        // Year and the following SP.
                        i += consumed + 1;
                        i_enter!(parser, buf, i, Inner::ExpHour);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ExpHour => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::colon_delim)? {
                    Scanned::Int { consumed, digits } => {
                        if digits != 2 {
                            return Err(Reject::BadLen);
                        }
                        *out = match out.checked_add(acc * 3600) {
                            Some(n) => n,
                            None => return Err(Reject::Neq),
                        };
                        i += consumed + 1;
                        i_enter!(parser, buf, i, Inner::ExpMin);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ExpMin => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::colon_delim)? {
                    Scanned::Int { consumed, digits } => {
                        if digits != 2 {
                            return Err(Reject::BadLen);
                        }
                        *out = match out.checked_add(acc * 60) {
                            Some(n) => n,
                            None => return Err(Reject::Neq),
                        };
                        i += consumed + 1;
                        i_enter!(parser, buf, i, Inner::ExpSec);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ExpSec => {
                let mut acc = 0;
                match scan::dec(&mut parser.carry, buf, i, &mut acc, scan::ws_delim)? {
                    Scanned::Int { consumed, digits } => {
                        if digits != 2 {
                            return Err(Reject::BadLen);
                        }
                        *out = match out.checked_add(acc) {
                            Some(n) => n,
                            None => return Err(Reject::Neq),
                        };
                        // The rest of the line is ` GMT`.
                        parser.skip = 4;
                        i += consumed;
                        i_jmp!(parser, Inner::ExpGmt);
                    }
                    Scanned::Postpone => return Ok(Field::Postpone),
                }
            }
            Inner::ExpGmt => {
                let take = (parser.skip as usize).min(buf.len() - i);
                parser.skip -= take as u8;
                i += take;
                if parser.skip > 0 {
                    return Ok(Field::Postpone);
                }
                i_enter!(parser, buf, i, Inner::ExpEol);
            }
            Inner::ExpEol => return eol(parser, buf, i, at),
            _ => unreachable!("expires sub-parser entered in {:?}", parser.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn run(value: &[u8]) -> Result<u32, Reject> {
        let mut parser = Parser::new();
        parser.inner = Inner::Expires;
        let mut out = 0;
        let buf = Bytes::copy_from_slice(value);
        match expires(&mut parser, &buf, 0, &mut out)? {
            Field::Done(_) => Ok(out),
            Field::Postpone => panic!("incomplete date {:?}", value),
        }
    }

    fn run_split(value: &[u8]) -> u32 {
        let mut parser = Parser::new();
        parser.inner = Inner::Expires;
        let mut out = 0;
        for (idx, b) in value.iter().enumerate() {
            let buf = Bytes::copy_from_slice(&[*b]);
            match expires(&mut parser, &buf, 0, &mut out).unwrap() {
                Field::Postpone => {
                    parser.value_len += 1;
                    assert!(idx < value.len() - 1, "date ended early");
                }
                Field::Done(_) => assert_eq!(idx, value.len() - 1),
            }
        }
        out
    }

    fn httpdate_epoch(value: &str) -> u32 {
        let t = httpdate::parse_http_date(value).expect("httpdate");
        t.duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs() as u32
    }

    #[test]
    fn rfc1123_epoch() {
        assert_eq!(run(b"Sun, 06 Nov 1994 08:49:37 GMT\r\n"), Ok(784111777));
    }

    #[test]
    fn matches_httpdate() {
        for date in &[
            "Sun, 06 Nov 1994 08:49:37 GMT",
            "Sat, 01 Jan 2000 00:00:00 GMT",
            "Tue, 29 Feb 2000 12:00:00 GMT",
            "Wed, 01 Mar 2000 00:00:00 GMT",
            "Thu, 31 Dec 2037 23:59:59 GMT",
        ] {
            let mut line = date.as_bytes().to_vec();
            line.extend_from_slice(b"\r\n");
            assert_eq!(run(&line), Ok(httpdate_epoch(date)), "{}", date);
        }
    }

    #[test]
    fn byte_at_a_time_split() {
        assert_eq!(run_split(b"Sun, 06 Nov 1994 08:49:37 GMT\r\n"), 784111777);
    }

    #[test]
    fn lowercase_month_with_known_tail_accepted() {
        // The month lookup switches on the exact first byte; months that
        // fall into the shared arm still compare case-insensitively.
        assert_eq!(run(b"Sun, 06 nov 1994 08:49:37 GMT\r\n"), Ok(784111777));
    }

    #[test]
    fn rfc850_rejected() {
        assert_eq!(
            run(b"Sunday, 06-Nov-94 08:49:37 GMT\r\n"),
            Err(Reject::Neq)
        );
    }

    #[test]
    fn pre_epoch_rejected() {
        assert_eq!(
            run(b"Wed, 01 Jan 1969 00:00:00 GMT\r\n"),
            Err(Reject::Neq)
        );
    }

    #[test]
    fn one_digit_day_rejected() {
        assert_eq!(run(b"Sun, 6 Nov 1994 08:49:37 GMT\r\n"), Err(Reject::BadLen));
    }
}
