// src/bin/utredact.rs
//
// ‥ … ≤ ≥ ≠ ≟ ×

//! Driver program _utredact_ drives the [_utredactlib_].
//!
//! Processes user-passed command-line arguments into [`Filters`] and a list
//! of file paths. Then each file is passed, one at a time, to a
//! [`LogRedactor`].
//!
//! A failure for one file is printed and the next file is still processed.
//! The exit code is non-zero if any file failed.
//!
//! [_utredactlib_]: utredactlib
//! [`Filters`]: utredactlib::redact::predicate::Filters
//! [`LogRedactor`]: utredactlib::redact::redactor::LogRedactor

#![allow(non_camel_case_types)]

use std::process::ExitCode;

use ::anyhow::{anyhow, Context};
use ::chrono::{
    DateTime,
    FixedOffset,
    Local,
    NaiveDateTime,
    Offset,
    TimeZone,
    Utc,
};
use ::clap::Parser;
use ::const_format::concatcp;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
    stack::stack_offset_set,
};
use ::utredactlib::common::{
    FPath,
    FPaths,
    BTMP_FPATH,
    UTMP_FPATH,
    WTMP_FPATH,
};
use ::utredactlib::data::utmpx::tv_sec_type;
#[allow(unused_imports)]
use ::utredactlib::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use ::utredactlib::redact::classifier::HostSessionPolicy;
use ::utredactlib::redact::predicate::Filters;
use ::utredactlib::redact::redactor::{lookup_user, LogRedactor, RedactSummary};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Datetime patterns accepted by `--since`; `(pattern, has_tz)`.
///
/// RFC 3339 and `@<seconds>` are tried before these.
const CLI_SINCE_PATTERNS: [(&str, bool); 8] = [
    ("%Y%m%dT%H%M%S", false),
    ("%Y-%m-%dT%H:%M:%S", false),
    ("%Y-%m-%d %H:%M:%S", false),
    ("%Y%m%dT%H%M%S%z", true),
    ("%Y-%m-%dT%H:%M:%S%z", true),
    ("%Y-%m-%dT%H:%M:%S%:z", true),
    ("%Y-%m-%d %H:%M:%S %z", true),
    ("%Y-%m-%d %H:%M:%S %:z", true),
];

const CGN_DUR_ADDSUB: &str = "addsub";
const CGN_DUR_UNITS: &str = "units";
const CGN_DUR_COUNT: &str = "count";
const CGN_DUR_UNIT: &str = "unit";

thread_local! {
    /// a whole relative offset, e.g. `"-4d12h"`
    static REGEX_DUR_OFFSET: Option<Regex> = {
        defñ!("thread_local! REGEX_DUR_OFFSET::new()");
        Regex::new(
            concatcp!("^(?P<", CGN_DUR_ADDSUB, r">[+\-])(?P<", CGN_DUR_UNITS, r">([\d]+[smhdw])+)$")
        ).ok()
    };
    /// one unit of a relative offset, e.g. `"12h"`
    static REGEX_DUR_UNIT: Option<Regex> = {
        defñ!("thread_local! REGEX_DUR_UNIT::new()");
        Regex::new(
            concatcp!(r"(?P<", CGN_DUR_COUNT, r">[\d]+)(?P<", CGN_DUR_UNIT, r">[smhdw])")
        ).ok()
    };
}

/// `--help` _afterword_ message.
const CLI_HELP_AFTER: &str = concatcp!(
    "\
At least one of USERNAME or --host is required.
At least one file must be selected with --utmp, --wtmp, --btmp, --all,
or --file.

With USERNAME, each login of that user is removed together with the
matching logout on the same terminal line and the login placeholder
that follows it. Sessions are never paired across a reboot.

DATETIME for --since may be:
    \"@1700000000\"           seconds since the Unix epoch
    \"-2d\", \"-1w3d\", \"-90m\"  relative to now; units s m h d w
    \"20231114T221320\"
    \"2023-11-14T22:13:20\"
    \"2023-11-14T22:13:20-08:00\"
Datetimes without a timezone use the local system timezone.

Default log files:
    ",
    UTMP_FPATH,
    "\n    ",
    WTMP_FPATH,
    "\n    ",
    BTMP_FPATH,
    "\n",
);

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "utredact",
    // write expanded information for the `--version` output
    version = concatcp!(
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Author: ", env!("CARGO_PKG_AUTHORS"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Redact the sessions of this user.
    #[clap(verbatim_doc_comment)]
    username: Option<String>,

    /// Redact from the utmp file.
    #[clap(short = 'u', long, verbatim_doc_comment)]
    utmp: bool,

    /// Redact from the wtmp file.
    #[clap(short = 'w', long, verbatim_doc_comment)]
    wtmp: bool,

    /// Redact from the btmp file.
    #[clap(short = 'b', long, verbatim_doc_comment)]
    btmp: bool,

    /// Redact from the utmp, wtmp, and btmp files.
    #[clap(short = 'a', long, verbatim_doc_comment)]
    all: bool,

    /// Redact from this file. May be passed more than once.
    #[clap(short = 'f', long = "file", value_name = "PATH", verbatim_doc_comment)]
    files: Vec<String>,

    /// Redact every record from this host.
    #[clap(short = 'i', long, verbatim_doc_comment)]
    host: Option<String>,

    /// Keep every record written before this datetime.
    /// To pass a value with leading "-" use "=" notation, e.g. "-s=-2d".
    #[clap(short = 's', long, value_name = "DATETIME", verbatim_doc_comment)]
    since: Option<String>,

    /// Also remove the logouts and login placeholders of sessions that
    /// were redacted because of --host.
    #[clap(long, verbatim_doc_comment)]
    track_host_sessions: bool,

    /// Count what would be redacted. Do not modify any file.
    #[clap(long, verbatim_doc_comment)]
    dry_run: bool,

    /// Do not check that USERNAME is in the passwd database.
    #[clap(long, verbatim_doc_comment)]
    no_lookup: bool,

    /// Print a summary for each file.
    #[clap(short = 'v', long, verbatim_doc_comment)]
    verbose: bool,
}

/// Parse a relative offset like `"-4d12h"` into signed seconds.
///
/// Repeated units are summed.
fn string_wdhms_to_seconds(val: &str) -> Option<i64> {
    defn!("({:?})", val);
    let (addsub, units): (i64, String) = REGEX_DUR_OFFSET.with(|re| {
        let captures = re.as_ref()?.captures(val)?;
        let addsub: i64 = match captures.name(CGN_DUR_ADDSUB)?.as_str() {
            "-" => -1,
            _ => 1,
        };
        Some((addsub, String::from(captures.name(CGN_DUR_UNITS)?.as_str())))
    })?;
    let counts: Vec<(String, String)> = REGEX_DUR_UNIT.with(|re| {
        Some(
            re.as_ref()?
                .captures_iter(units.as_str())
                .filter_map(|captures| {
                    Some((
                        String::from(captures.name(CGN_DUR_COUNT)?.as_str()),
                        String::from(captures.name(CGN_DUR_UNIT)?.as_str()),
                    ))
                })
                .collect(),
        )
    })?;
    let mut seconds: i64 = 0;
    for (count, unit) in counts.iter() {
        let count: i64 = count.parse::<i64>().ok()?;
        let multiplier: i64 = match unit.as_str() {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 60 * 60 * 24,
            "w" => 60 * 60 * 24 * 7,
            _ => return None,
        };
        seconds = seconds.checked_add(count.checked_mul(multiplier)?)?;
    }
    let seconds: i64 = seconds.checked_mul(addsub)?;
    defx!("return {}", seconds);

    Some(seconds)
}

/// Transform a user-passed `--since` value into seconds since the Unix
/// epoch.
///
/// `tz_offset` is used for datetimes without a timezone. `now_utc` is the
/// base of relative offsets.
fn process_since(
    val: &str,
    tz_offset: &FixedOffset,
    now_utc: &DateTime<Utc>,
) -> anyhow::Result<tv_sec_type> {
    defn!("({:?}, {:?}, {:?})", val, tz_offset, now_utc);
    if let Some(secs) = val.strip_prefix('@') {
        let secs: tv_sec_type = secs
            .parse::<tv_sec_type>()
            .with_context(|| format!("Unable to parse seconds from {:?}", val))?;
        defx!("return {}", secs);
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(val) {
        defx!("rfc3339 {:?}", dt);
        return Ok(dt.timestamp());
    }
    for (pattern, has_tz) in CLI_SINCE_PATTERNS.iter() {
        defo!("pattern {:?} has_tz {}", pattern, has_tz);
        let dt: Option<DateTime<FixedOffset>> = match has_tz {
            true => DateTime::parse_from_str(val, pattern).ok(),
            false => NaiveDateTime::parse_from_str(val, pattern)
                .ok()
                .and_then(|naive| tz_offset.from_local_datetime(&naive).single()),
        };
        if let Some(dt) = dt {
            defx!("matched {:?}", dt);
            return Ok(dt.timestamp());
        }
    }
    match string_wdhms_to_seconds(val) {
        Some(offset) => {
            let secs = now_utc
                .timestamp()
                .checked_add(offset)
                .ok_or_else(|| anyhow!("Relative offset {:?} is out of range", val))?;
            defx!("relative {}", secs);
            Ok(secs)
        }
        None => {
            defx!("no match");
            Err(anyhow!("Unable to parse a datetime from {:?}", val))
        }
    }
}

/// The selected file paths, in order, without repeats.
fn process_paths(args: &CLI_Args) -> FPaths {
    let mut paths: FPaths = FPaths::with_capacity(3 + args.files.len());
    let mut push = |path: FPath| {
        if !paths.contains(&path) {
            paths.push(path);
        }
    };
    if args.utmp || args.all {
        push(FPath::from(UTMP_FPATH));
    }
    if args.wtmp || args.all {
        push(FPath::from(WTMP_FPATH));
    }
    if args.btmp || args.all {
        push(FPath::from(BTMP_FPATH));
    }
    for file in args.files.iter() {
        push(file.clone());
    }

    paths
}

/// Process user-passed CLI argument strings into a `LogRedactor`, the file
/// paths, and the verbose flag.
fn cli_process_args(args: CLI_Args) -> anyhow::Result<(LogRedactor, FPaths, bool)> {
    defo!("args {:?}", args);

    let user: Option<&str> = args.username.as_deref().filter(|s| !s.is_empty());
    let host: Option<&str> = args.host.as_deref().filter(|s| !s.is_empty());
    if user.is_none() && host.is_none() {
        return Err(anyhow!("Pass a USERNAME or --host"));
    }

    let paths = process_paths(&args);
    if paths.is_empty() {
        return Err(anyhow!("Pass at least one of --utmp, --wtmp, --btmp, --all, or --file"));
    }

    if let Some(user) = user {
        if !args.no_lookup {
            lookup_user(user)?;
        }
    }

    let cutoff: Option<tv_sec_type> = match args.since.as_deref() {
        Some(since) => {
            let tz_offset: FixedOffset = Local::now().offset().fix();
            Some(process_since(since, &tz_offset, &Utc::now())?)
        }
        None => None,
    };

    let host_policy = match args.track_host_sessions {
        true => HostSessionPolicy::Track,
        false => HostSessionPolicy::Bypass,
    };
    let redactor = LogRedactor::new(Filters::new(user, host, cutoff))
        .with_host_policy(host_policy)
        .with_dry_run(args.dry_run);
    defo!("redactor {:?}", redactor);

    Ok((redactor, paths, args.verbose || args.dry_run))
}

/// Print what happened to one file.
fn print_summary(summary: &RedactSummary, verbose: bool) {
    if summary.bytes_trailing != 0 {
        e_wrn!(
            "{} trailing bytes in {:?} do not form a whole record; they were dropped",
            summary.bytes_trailing,
            summary.path
        );
    }
    if verbose {
        println!("{}", summary);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// main
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process the user-passed command-line arguments.
/// Redact each file.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let (redactor, paths, verbose) = match cli_process_args(CLI_Args::parse()) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{}", err);
            defx!("exitcode FAILURE");
            return ExitCode::FAILURE;
        }
    };

    let mut failed: usize = 0;
    for path in paths.iter() {
        defo!("path {:?}", path);
        match redactor.redact_path(path) {
            Ok(summary) => print_summary(&summary, verbose),
            Err(err) => {
                e_err!("{}", err);
                failed += 1;
            }
        }
    }

    let exitcode = if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
