// src/trigger.rs
//! Trigger predicates over a [`Story`].
//!
//! Triggers form an immutable tree. Composite triggers hold `Arc`s to their
//! operands so one definition can be shared by several composites and by the
//! active list without copying.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::TimeParseError;
use crate::phrase::Phrase;
use crate::story::Story;

/// Literal format of BEFORE/AFTER arguments, e.g. `18 Sep 2016 09:00:00`.
pub const TIME_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Offset of the reference zone (UTC-05:00, "EST") in seconds east of UTC.
pub const REFERENCE_OFFSET_SECS: i32 = -5 * 3600;

/// The single zone every time comparison is carried out in.
pub fn reference_zone() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_SECS).expect("reference offset within ±24h")
}

/// Parse a BEFORE/AFTER literal as wall-clock time in the reference zone.
pub fn parse_reference_time(input: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    let literal = input.trim();
    let fail = |reason: String| TimeParseError {
        input: input.to_string(),
        reason,
    };

    // chrono's %Y also takes short years ("16" -> 0016); require exactly four digits.
    static RE_SHAPE: OnceCell<Regex> = OnceCell::new();
    let re_shape = RE_SHAPE.get_or_init(|| {
        Regex::new(r"^\d{1,2} [A-Za-z]{3} \d{4} \d{1,2}:\d{1,2}:\d{1,2}$").expect("time literal regex")
    });
    if !re_shape.is_match(literal) {
        return Err(fail("does not match the literal format".into()));
    }

    let naive =
        NaiveDateTime::parse_from_str(literal, TIME_FORMAT).map_err(|e| fail(e.to_string()))?;
    // `naive` is reference-zone wall clock; shift to UTC before attaching the offset.
    Ok(reference_zone().from_utc_datetime(&(naive - reference_zone())))
}

pub type TriggerRef = Arc<Trigger>;

#[derive(Debug, Clone)]
pub enum Trigger {
    Title(Phrase),
    Description(Phrase),
    Before(DateTime<FixedOffset>),
    After(DateTime<FixedOffset>),
    Not(TriggerRef),
    And(TriggerRef, TriggerRef),
    Or(TriggerRef, TriggerRef),
}

impl Trigger {
    pub fn title(phrase: &str) -> Self {
        Self::Title(Phrase::new(phrase))
    }

    pub fn description(phrase: &str) -> Self {
        Self::Description(Phrase::new(phrase))
    }

    pub fn before(time: &str) -> Result<Self, TimeParseError> {
        parse_reference_time(time).map(Self::Before)
    }

    pub fn after(time: &str) -> Result<Self, TimeParseError> {
        parse_reference_time(time).map(Self::After)
    }

    pub fn not(inner: TriggerRef) -> Self {
        Self::Not(inner)
    }

    pub fn and(left: TriggerRef, right: TriggerRef) -> Self {
        Self::And(left, right)
    }

    pub fn or(left: TriggerRef, right: TriggerRef) -> Self {
        Self::Or(left, right)
    }

    /// Does this trigger fire on `story`? Total and side-effect free.
    pub fn evaluate(&self, story: &Story) -> bool {
        match self {
            Self::Title(p) => p.is_in(&story.title),
            Self::Description(p) => p.is_in(&story.description),
            Self::Before(threshold) => published_in_reference_zone(story) < *threshold,
            Self::After(threshold) => published_in_reference_zone(story) > *threshold,
            Self::Not(inner) => !inner.evaluate(story),
            Self::And(l, r) => l.evaluate(story) && r.evaluate(story),
            Self::Or(l, r) => l.evaluate(story) || r.evaluate(story),
        }
    }

    /// Short kind label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Title(_) => "TITLE",
            Self::Description(_) => "DESCRIPTION",
            Self::Before(_) => "BEFORE",
            Self::After(_) => "AFTER",
            Self::Not(_) => "NOT",
            Self::And(..) => "AND",
            Self::Or(..) => "OR",
        }
    }
}

fn published_in_reference_zone(story: &Story) -> DateTime<FixedOffset> {
    story.published_at.with_timezone(&reference_zone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(title: &str, description: &str, published: &str) -> Story {
        Story::new(
            "guid-1",
            title,
            description,
            "",
            DateTime::parse_from_rfc3339(published).unwrap(),
        )
    }

    fn at(published: &str) -> Story {
        story("", "", published)
    }

    #[test]
    fn reference_time_is_utc_minus_five() {
        let t = parse_reference_time("18 Sep 2016 09:00:00").unwrap();
        assert_eq!(t.offset().local_minus_utc(), REFERENCE_OFFSET_SECS);
        assert_eq!(
            t,
            DateTime::parse_from_rfc3339("2016-09-18T14:00:00Z").unwrap()
        );
    }

    #[test]
    fn bad_time_literal_is_rejected() {
        for bad in [
            "not-a-date",
            "2016-09-18 09:00:00",
            "18 Sep 2016",
            "",
            "18 Sep 16 09:00:00",
            "18 sep 16 09:00:00",
            "18 Sep 02016 09:00:00",
            "18 Sep 2016 09:00:00 EST",
        ] {
            let err = Trigger::before(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
        assert!(Trigger::after("31 Foo 2016 09:00:00").is_err());
        assert!(Trigger::after("31 Feb 2016 09:00:00").is_err());
    }

    #[test]
    fn four_digit_year_and_loose_case_accepted() {
        let a = parse_reference_time("3 oct 2016 7:05:09").unwrap();
        let b = parse_reference_time("03 Oct 2016 07:05:09").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, DateTime::parse_from_rfc3339("2016-10-03T12:05:09Z").unwrap());
    }

    #[test]
    fn phrase_triggers_read_their_own_field() {
        let s = story("Election night!", "Nothing about votes", "2016-10-12T23:59:59Z");
        assert!(Trigger::title("election").evaluate(&s));
        assert!(!Trigger::description("election").evaluate(&s));
        assert!(Trigger::description("about votes").evaluate(&s));
        assert!(!Trigger::title("").evaluate(&s));
    }

    #[test]
    fn time_triggers_compare_instants_across_zones() {
        let before = Trigger::before("12 Oct 2016 23:59:59").unwrap();
        let after = Trigger::after("12 Oct 2016 23:59:59").unwrap();

        // 23:59:59 EST == 04:59:59Z next day
        let exact_utc = at("2016-10-13T04:59:59Z");
        let exact_est = at("2016-10-12T23:59:59-05:00");
        for s in [&exact_utc, &exact_est] {
            assert!(!before.evaluate(s));
            assert!(!after.evaluate(s));
        }

        // Same wall clock, but in UTC: five hours earlier as an instant.
        let earlier = at("2016-10-12T23:59:59Z");
        assert!(before.evaluate(&earlier));
        assert!(!after.evaluate(&earlier));

        let later = at("2016-10-13T05:00:00+00:00");
        assert!(after.evaluate(&later));
        assert!(!before.evaluate(&later));

        // A positive offset story that is one second later as an instant.
        let tokyo = at("2016-10-13T14:00:00+09:00");
        assert!(after.evaluate(&tokyo));
    }

    #[test]
    fn composites_follow_boolean_logic() {
        let yes: TriggerRef = Arc::new(Trigger::title("yes"));
        let no: TriggerRef = Arc::new(Trigger::title("no"));
        let s = story("yes please", "", "2016-10-12T00:00:00Z");

        assert!(!Trigger::not(yes.clone()).evaluate(&s));
        assert!(Trigger::not(no.clone()).evaluate(&s));
        assert!(Trigger::and(yes.clone(), yes.clone()).evaluate(&s));
        assert!(!Trigger::and(yes.clone(), no.clone()).evaluate(&s));
        assert!(Trigger::or(no.clone(), yes.clone()).evaluate(&s));
        assert!(!Trigger::or(no.clone(), no.clone()).evaluate(&s));

        let nested = Trigger::not(Arc::new(Trigger::and(yes, Arc::new(Trigger::not(no)))));
        assert!(!nested.evaluate(&s));
        assert_eq!(nested.kind(), "NOT");
    }

    #[test]
    fn not_inverts_every_kind_and_evaluation_is_repeatable() {
        let before: TriggerRef = Arc::new(Trigger::before("1 Jan 2020 00:00:00").unwrap());
        let title: TriggerRef = Arc::new(Trigger::title("cat"));
        let all: Vec<TriggerRef> = vec![
            title.clone(),
            Arc::new(Trigger::description("dog")),
            before.clone(),
            Arc::new(Trigger::after("1 Jan 2020 00:00:00").unwrap()),
            Arc::new(Trigger::or(title.clone(), before.clone())),
            Arc::new(Trigger::and(title, before)),
        ];
        let stories = [
            story("a cat", "a dog", "2019-06-01T00:00:00Z"),
            story("catalog", "", "2021-06-01T00:00:00+02:00"),
            story("", "dog days", "2020-01-01T05:00:00Z"),
        ];
        for t in &all {
            let inverted = Trigger::not(t.clone());
            for s in &stories {
                let first = t.evaluate(s);
                assert_eq!(first, t.evaluate(s));
                assert_eq!(inverted.evaluate(s), !first);
            }
        }
    }
}
