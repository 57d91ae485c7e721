use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::PopularityProfile;
use crate::series::YearRange;
use crate::surge::ThresholdBand;

/// Count, per year, how many names peaked in it.
pub fn surge_year_tally(profiles: &[PopularityProfile]) -> BTreeMap<i32, usize> {
    let mut tally = BTreeMap::new();
    for profile in profiles {
        for event in &profile.events {
            *tally.entry(event.year).or_insert(0) += 1;
        }
    }
    tally
}

pub fn build_report(
    range: YearRange,
    band: ThresholdBand,
    profiles: &[PopularityProfile],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Given-Name Surge Report");
    let _ = writeln!(
        output,
        "Years {}-{} with series maxima in [{}, {}]",
        range.start(),
        range.end(),
        band.min(),
        band.max()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Surging Names");

    if profiles.is_empty() {
        let _ = writeln!(output, "No names matched this window and band.");
    } else {
        for profile in profiles {
            let peaks = profile
                .events
                .iter()
                .map(|event| format!("{} ({})", event.year, event.count))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                output,
                "- {}: peaks in {} ({} uses over the range)",
                profile.name,
                peaks,
                profile.series.total()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Surge Years");

    let tally = surge_year_tally(profiles);
    if tally.is_empty() {
        let _ = writeln!(output, "No surge years in this window.");
    } else {
        for (year, names) in tally {
            let _ = writeln!(output, "- {year}: {names} name(s) peaked");
        }
    }

    output
}
