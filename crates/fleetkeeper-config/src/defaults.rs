//! Compiled-in default values for configuration keys the user may omit.
//!
//! Mirrors the defaults shipped by the original tool: the tag-rename table
//! and the full tracker classification table ship with sensible presets so a
//! fresh deployment works without reproducing this boilerplate by hand.

use std::collections::BTreeMap;

use crate::duration::DurationSpec;
use crate::model::{HrSpec, TrackerDetail};

/// Default `old_tag -> new_tag` rename table.
#[must_use]
pub fn default_tag_renamer() -> BTreeMap<String, String> {
    [
        ("cross-seed", "xs"),
        ("sonarr.cross-seed", "xs.tv"),
        ("tv.cross-seed", "xs.tv"),
        ("radarr.cross-seed", "xs.movies"),
        ("movies.cross-seed", "xs.movies"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn hr(time: &str, ratio: Option<f64>, percent: Option<f64>) -> Option<HrSpec> {
    Some(HrSpec {
        time: DurationSpec::Human(time.to_string()),
        ratio,
        percent,
    })
}

/// Default tracker classification table.
#[must_use]
pub fn default_tracker_details() -> BTreeMap<String, TrackerDetail> {
    let entries: Vec<(&str, &str, Option<HrSpec>, Option<&str>)> = vec![
        ("myanonamouse", "MAM", hr("3d", None, None), Some("ebooks")),
        ("aither", "ATH", hr("5d", None, Some(20.0)), None),
        ("blutopia", "BLU", hr("7d", None, Some(10.0)), None),
        (
            "torrentleech|tleechreload",
            "TL",
            hr("7d", Some(1.0), Some(10.0)),
            None,
        ),
        ("fearnopeer", "FNP", None, None),
        ("f1carreras", "F1C", hr("2d", None, None), None),
        ("avistaz", "aZ", hr("7d", Some(0.9), Some(10.0)), None),
        ("speedapp", "SPD", hr("48h", Some(1.0), None), None),
        ("filelist|thefl", "FL", hr("2d", Some(1.0), None), None),
        ("torrenteros", "TTR", hr("3d", None, None), None),
        ("sportscult", "SC", hr("7d", Some(1.0), None), None),
        ("hd-olimpo", "HDO", hr("3d", None, Some(15.0)), None),
        ("torrentland", "TLand", hr("96h", None, Some(10.0)), None),
        ("hd-space", "HDS", hr("2d", None, None), None),
        ("xbytes", "XB", hr("3d", None, Some(50.0)), None),
        ("hdzero", "HDZ", hr("5d", None, Some(10.0)), None),
        (
            "digitalcore",
            "DC",
            hr("5d", Some(1.0), Some(10.0)),
            None,
        ),
        ("seedpool", "SP", hr("10d", None, Some(10.0)), None),
        ("opsfet.ch", "OPS", None, None),
        ("reelflix", "RFLX", None, None),
        ("divteam", "DivT", None, None),
        ("hawke", "HUNO", hr("5d", None, Some(10.0)), None),
        ("lst", "LST", hr("3d", None, Some(10.0)), None),
        (
            "beyond-hd",
            "BHD",
            hr("5d", Some(1.0), Some(30.0)),
            None,
        ),
        ("default", "other", None, None),
    ];

    entries
        .into_iter()
        .map(|(keyword, tag, hr_spec, category)| {
            (
                keyword.to_string(),
                TrackerDetail {
                    tag: tag.to_string(),
                    hr: hr_spec,
                    category: category.map(str::to_string),
                },
            )
        })
        .collect()
}
