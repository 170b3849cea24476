//! Grouped frame layout.
//!
//! Frame specs (rows of a CSV export) are grouped by exact size, and each
//! group is laid out as a titled, row-wrapped strip below the previous one.
//! Everything here is pure arithmetic: the engine creates the nodes, reads
//! back the title height the host measured, and feeds it to [`place_group`].
//!
//! The vertical position is an explicit [`LayoutCursor`] value that goes into
//! each group's placement and comes back advanced, so a whole call is a fold
//! over the groups with no shared state.

use crate::config::LayoutConfig;
use crate::model::{Bounds, Paint, Placement, Rgb};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

// ─── Frame specs & grouping ──────────────────────────────────────────────

/// One frame to create, as exported from a spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSpec {
    pub name: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub width: f32,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub height: f32,
}

impl FrameSpec {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Whether the host can create a frame of this size.
    pub fn has_valid_size(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// CSV cells often arrive as strings; accept `"1080"` as well as `1080`.
fn number_or_numeric_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f32),
        Text(String),
    }

    match Cell::deserialize(deserializer)? {
        Cell::Number(n) => Ok(n),
        Cell::Text(s) => s
            .trim()
            .parse::<f32>()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}

/// Group key for a size: `"{width}x{height}"`, without trailing `.0`.
pub fn size_key(width: f32, height: f32) -> String {
    format!("{width}x{height}")
}

/// Frame specs sharing one exact size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeGroup {
    pub key: String,
    pub width: f32,
    pub height: f32,
    pub specs: Vec<FrameSpec>,
}

impl SizeGroup {
    /// Text of the group's title node: `"1920 x 1080"`.
    pub fn title(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Partition specs by exact size, keeping first-seen order of groups and of
/// specs within each group.
pub fn group_by_size(specs: &[FrameSpec]) -> Vec<SizeGroup> {
    let mut groups: IndexMap<String, SizeGroup> = IndexMap::new();
    for spec in specs {
        let key = size_key(spec.width, spec.height);
        groups
            .entry(key.clone())
            .or_insert_with(|| SizeGroup {
                key,
                width: spec.width,
                height: spec.height,
                specs: Vec::new(),
            })
            .specs
            .push(spec.clone());
    }
    groups.into_values().collect()
}

// ─── Page context ────────────────────────────────────────────────────────

/// Title color contrasting with the page background: white on dark solid
/// backgrounds (`L < 0.5`), black otherwise or when there is no solid paint.
pub fn title_color(background: Option<&Paint>) -> Rgb {
    match background.and_then(Paint::solid_color) {
        Some(bg) if bg.luminance() < 0.5 => Rgb::WHITE,
        _ => Rgb::BLACK,
    }
}

/// Vertical layout position carried from one group to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutCursor {
    pub y: f32,
}

impl LayoutCursor {
    /// Start below everything already on the page, or at a fixed offset on an
    /// empty page.
    pub fn below(existing: &[Bounds], config: &LayoutConfig) -> Self {
        if existing.is_empty() {
            return Self {
                y: config.empty_page_y,
            };
        }
        let lowest = existing.iter().map(Bounds::bottom).fold(0.0f32, f32::max);
        Self {
            y: lowest + config.below_content_gap,
        }
    }
}

/// Right boundary a row may reach before wrapping.
pub fn wrap_limit(viewport_width: f32, config: &LayoutConfig) -> f32 {
    config.start_x + viewport_width * config.wrap_ratio
}

// ─── Group placement ─────────────────────────────────────────────────────

/// Position of one frame of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFrame {
    pub spec: FrameSpec,
    pub bounds: Bounds,
    /// Zero-based row within the group.
    pub row: usize,
}

/// Positions computed for one size group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlacement {
    pub title: Placement,
    pub frames: Vec<PlacedFrame>,
    /// Lowest y reached by the group (frame bottoms and row starts).
    pub lowest_edge: f32,
}

/// Lay out one group under its title, wrapping rows at `wrap_limit`.
///
/// A row wraps only after a frame pushes the horizontal cursor past the
/// limit and that frame is not the group's last, so a single-frame group
/// never wraps. Returns the placement and the cursor for the next group.
pub fn place_group(
    group: &SizeGroup,
    cursor: LayoutCursor,
    title_height: f32,
    wrap_limit: f32,
    config: &LayoutConfig,
) -> (GroupPlacement, LayoutCursor) {
    let title = Placement {
        x: config.start_x,
        y: cursor.y,
    };

    let mut x = config.start_x;
    let mut y = cursor.y + title_height + config.title_spacing_y;
    let mut row = 0usize;
    let mut row_height = 0.0f32;
    let mut lowest_edge = y;
    let mut frames = Vec::with_capacity(group.len());

    for (i, spec) in group.specs.iter().enumerate() {
        let bounds = Bounds {
            x,
            y,
            width: spec.width,
            height: spec.height,
        };
        frames.push(PlacedFrame {
            spec: spec.clone(),
            bounds,
            row,
        });

        x += spec.width + config.frame_spacing_x;
        row_height = row_height.max(spec.height);
        lowest_edge = lowest_edge.max(bounds.bottom());

        let is_last = i + 1 == group.len();
        if x > wrap_limit && !is_last {
            x = config.start_x;
            y += row_height + config.frame_spacing_y;
            row += 1;
            row_height = 0.0;
            lowest_edge = lowest_edge.max(y);
        }
    }

    let next = LayoutCursor {
        y: lowest_edge + config.group_spacing_y,
    };
    (
        GroupPlacement {
            title,
            frames,
            lowest_edge,
        },
        next,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cfg() -> LayoutConfig {
        LayoutConfig::default()
    }

    /// Every group with a fixed title height, threading the cursor through.
    fn plan_layout(
        groups: &[SizeGroup],
        start: LayoutCursor,
        title_height: f32,
        wrap_limit: f32,
        config: &LayoutConfig,
    ) -> (Vec<GroupPlacement>, LayoutCursor) {
        let mut cursor = start;
        let mut placements = Vec::with_capacity(groups.len());
        for group in groups {
            let (placement, next) = place_group(group, cursor, title_height, wrap_limit, config);
            placements.push(placement);
            cursor = next;
        }
        (placements, cursor)
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let specs = vec![
            FrameSpec::new("A", 300.0, 200.0),
            FrameSpec::new("C", 500.0, 400.0),
            FrameSpec::new("B", 300.0, 200.0),
        ];
        let groups = group_by_size(&specs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "300x200");
        assert_eq!(
            groups[0].specs.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(groups[1].key, "500x400");
        assert_eq!(groups[1].title(), "500 x 400");
    }

    #[test]
    fn groups_partition_the_input_by_exact_size() {
        let sizes: [&[(f32, f32)]; 6] = [
            &[],
            &[(10.0, 10.0)],
            &[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0)],
            &[(1.0, 2.0), (2.0, 1.0), (1.0, 2.0), (2.0, 1.0)],
            &[(300.0, 200.0), (500.0, 400.0), (300.0, 200.0), (300.5, 200.0), (500.0, 400.0)],
            &[(1080.0, 1920.0), (1920.0, 1080.0), (1080.0, 1080.0), (1080.0, 1920.0)],
        ];

        for case in sizes {
            let specs: Vec<FrameSpec> = case
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| FrameSpec::new(format!("F{i}"), w, h))
                .collect();
            let groups = group_by_size(&specs);

            // Every spec lands in exactly one group, in input order.
            let mut regrouped: Vec<&FrameSpec> = groups.iter().flat_map(|g| &g.specs).collect();
            regrouped.sort_by_key(|s| s.name[1..].parse::<usize>().unwrap());
            assert_eq!(regrouped, specs.iter().collect::<Vec<_>>(), "case {case:?}");

            // Same group iff same size.
            for (gi, group) in groups.iter().enumerate() {
                for spec in &group.specs {
                    assert_eq!((spec.width, spec.height), (group.width, group.height));
                }
                for other in &groups[gi + 1..] {
                    assert_ne!((group.width, group.height), (other.width, other.height));
                }
            }
        }
    }

    #[test]
    fn fractional_sizes_keep_their_digits() {
        assert_eq!(size_key(300.5, 200.0), "300.5x200");
    }

    #[test]
    fn empty_input_has_no_groups() {
        assert!(group_by_size(&[]).is_empty());
    }

    #[test]
    fn csv_strings_are_numbers() {
        let spec: FrameSpec =
            serde_json::from_str(r#"{"name":"Story","width":"1080","height":1920}"#).unwrap();
        assert_eq!(spec, FrameSpec::new("Story", 1080.0, 1920.0));

        let bad = serde_json::from_str::<FrameSpec>(r#"{"name":"x","width":"wide","height":1}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn title_color_follows_background() {
        let dark = Paint::solid(Rgb::new(0.1, 0.1, 0.1));
        let light = Paint::solid(Rgb::new(0.9, 0.9, 0.9));
        let gradient = Paint::GradientLinear { stops: vec![] };
        assert_eq!(title_color(Some(&dark)), Rgb::WHITE);
        assert_eq!(title_color(Some(&light)), Rgb::BLACK);
        assert_eq!(title_color(Some(&gradient)), Rgb::BLACK);
        assert_eq!(title_color(None), Rgb::BLACK);
    }

    #[test]
    fn cursor_starts_below_existing_content() {
        let existing = [
            Bounds {
                x: 0.0,
                y: 100.0,
                width: 50.0,
                height: 400.0,
            },
            Bounds {
                x: 0.0,
                y: 900.0,
                width: 10.0,
                height: 100.0,
            },
        ];
        assert_eq!(LayoutCursor::below(&existing, &cfg()).y, 1150.0);
        assert_eq!(LayoutCursor::below(&[], &cfg()).y, 100.0);
    }

    #[test]
    fn cursor_ignores_content_above_origin() {
        let existing = [Bounds {
            x: 0.0,
            y: -500.0,
            width: 10.0,
            height: 100.0,
        }];
        assert_eq!(LayoutCursor::below(&existing, &cfg()).y, 150.0);
    }

    #[test]
    fn same_row_frames_are_spaced() {
        let groups = group_by_size(&[
            FrameSpec::new("A", 300.0, 200.0),
            FrameSpec::new("B", 300.0, 200.0),
        ]);
        let (placement, next) =
            place_group(&groups[0], LayoutCursor { y: 100.0 }, 97.0, 900.0, &cfg());

        let a = placement.frames[0].bounds;
        let b = placement.frames[1].bounds;
        assert_eq!(placement.title, Placement { x: 100.0, y: 100.0 });
        assert_eq!(a.y, 100.0 + 97.0 + 70.0);
        assert_eq!(b.x, a.x + 300.0 + 40.0);
        assert_eq!(b.y, a.y);
        assert_eq!(next.y, a.bottom() + 500.0);
    }

    #[test]
    fn rows_wrap_past_the_limit() {
        // Limit 900: after A the cursor is at 540, after B at 980 -> wrap.
        let specs: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|n| FrameSpec::new(*n, 400.0, 300.0))
            .collect();
        let groups = group_by_size(&specs);
        let (placement, next) =
            place_group(&groups[0], LayoutCursor { y: 0.0 }, 0.0, 900.0, &cfg());

        let rows: Vec<usize> = placement.frames.iter().map(|f| f.row).collect();
        assert_eq!(rows, vec![0, 0, 1]);
        let c = placement.frames[2].bounds;
        assert_eq!(c.x, 100.0);
        assert_eq!(c.y, 70.0 + 300.0 + 40.0);
        assert_eq!(placement.lowest_edge, c.bottom());
        assert_eq!(next.y, c.bottom() + 500.0);
    }

    #[test]
    fn last_frame_never_triggers_a_wrap() {
        let groups = group_by_size(&[FrameSpec::new("Huge", 5000.0, 100.0)]);
        let (placement, _) = place_group(&groups[0], LayoutCursor { y: 0.0 }, 0.0, 900.0, &cfg());
        assert_eq!(placement.frames.len(), 1);
        assert_eq!(placement.frames[0].row, 0);
        assert_eq!(placement.lowest_edge, 70.0 + 100.0);
    }

    #[test]
    fn vertical_cursor_is_monotonic_within_and_across_groups() {
        let specs: Vec<_> = (0..12)
            .map(|i| {
                let w = 150.0 + (i % 4) as f32 * 100.0;
                FrameSpec::new(format!("f{i}"), w, 120.0 + (i % 3) as f32 * 40.0)
            })
            .collect();
        let groups = group_by_size(&specs);
        let (placements, end) = plan_layout(&groups, LayoutCursor { y: 100.0 }, 97.0, 900.0, &cfg());

        let mut last_title_y = f32::MIN;
        for placement in &placements {
            assert!(placement.title.y > last_title_y);
            last_title_y = placement.title.y;

            let mut last_y = f32::MIN;
            for frame in &placement.frames {
                assert!(frame.bounds.y >= last_y, "frame moved up within a group");
                assert!(frame.bounds.y > placement.title.y);
                last_y = frame.bounds.y;
            }
        }
        assert!(end.y > last_title_y);
    }

    #[test]
    fn groups_do_not_overlap() {
        let specs = vec![
            FrameSpec::new("A", 300.0, 200.0),
            FrameSpec::new("B", 300.0, 200.0),
            FrameSpec::new("C", 500.0, 400.0),
        ];
        let groups = group_by_size(&specs);
        let (placements, _) = plan_layout(&groups, LayoutCursor { y: 100.0 }, 97.0, 900.0, &cfg());
        let all: Vec<Bounds> = placements
            .iter()
            .flat_map(|p| p.frames.iter().map(|f| f.bounds))
            .collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
        assert!(placements[1].title.y > placements[0].lowest_edge);
    }
}
