use crate::board::{Board, NodeId};
use crate::region::Region;
use crate::track_color::TrackColor;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use strum::{EnumCount, IntoEnumIterator};

/// Bonus for the number of (station, line) pairs where the station is a tourist site.
pub const TOURIST_BONUS: [u32; 11] = [0, 1, 2, 4, 6, 8, 11, 14, 17, 21, 25];

/// Points per station shared by exactly 2, 3 and 4 lines.
const BI_COLOR_POINTS: u32 = 2;
const TRI_COLOR_POINTS: u32 = 5;
const QUAD_COLOR_POINTS: u32 = 9;

const RIVER_CROSSING_POINTS: u32 = 2;

/// How a single line scored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ColorScore {
    /// Distinct regions the line went through.
    pub regions: u32,
    /// Most distinct stations visited within a single region.
    pub max_in_region: u32,
    /// Distinct claimed tracks crossing the river.
    pub crossings: u32,
    pub points: u32,
}

/// The full breakdown of a game's score.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ScoreSheet {
    /// Indexed by [`TrackColor::index`].
    pub colors: [ColorScore; TrackColor::COUNT],
    pub bi_color: u32,
    pub tri_color: u32,
    pub quad_color: u32,
    pub tourist: u32,
}

impl ScoreSheet {
    #[inline]
    pub fn color(&self, color: TrackColor) -> &ColorScore {
        &self.colors[color.index()]
    }

    /// Sum of every line and every bonus.
    pub fn total(&self) -> u32 {
        self.colors.iter().map(|score| score.points).sum::<u32>()
            + self.bi_color
            + self.tri_color
            + self.quad_color
            + self.tourist
    }

    /// Points keyed by line color, then `"bi-color"`, `"tri-color"`, `"quad-color"` and `"tourist"`.
    pub fn to_map(&self) -> BTreeMap<String, u32> {
        let mut map: BTreeMap<String, u32> = TrackColor::iter()
            .map(|color| (color.to_string(), self.color(color).points))
            .collect();

        map.insert("bi-color".to_owned(), self.bi_color);
        map.insert("tri-color".to_owned(), self.tri_color);
        map.insert("quad-color".to_owned(), self.quad_color);
        map.insert("tourist".to_owned(), self.tourist);
        map
    }
}

/// Bonus for `count` tourist memberships.
///
/// Up to ten memberships follow [`TOURIST_BONUS`], with ten capped at 21;
/// the top value of 25 is only earned past ten.
///
/// # Example
/// ```
/// use london_system::score::tourist_bonus;
///
/// assert_eq!(tourist_bonus(0), 0);
/// assert_eq!(tourist_bonus(3), 4);
/// assert_eq!(tourist_bonus(10), 21);
/// assert_eq!(tourist_bonus(11), 25);
/// assert_eq!(tourist_bonus(40), 25);
/// ```
pub fn tourist_bonus(count: usize) -> u32 {
    let last = TOURIST_BONUS.len() - 1;

    if count > last {
        TOURIST_BONUS[last]
    } else {
        TOURIST_BONUS[count.min(last - 1)]
    }
}

/// Scores a board from the records of each line.
///
/// Stations visited and tracks claimed more than once only count once per line.
pub fn score(board: &Board) -> ScoreSheet {
    let mut sheet = ScoreSheet::default();
    let mut visited: [HashSet<NodeId>; TrackColor::COUNT] = Default::default();

    for color in TrackColor::iter() {
        let track = board.track(color);
        let stations = &mut visited[color.index()];
        let mut per_region: HashMap<Region, u32> = HashMap::new();

        for &node in track.visited() {
            if stations.insert(node) {
                *per_region.entry(board.nodes()[node].region).or_default() += 1;
            }
        }

        let crossings = track
            .claimed()
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|&&edge| board.edges()[edge].crosses_river())
            .count() as u32;

        let regions = per_region.len() as u32;
        let max_in_region = per_region.values().copied().max().unwrap_or(0);

        sheet.colors[color.index()] = ColorScore {
            regions,
            max_in_region,
            crossings,
            points: regions * max_in_region + RIVER_CROSSING_POINTS * crossings,
        };
    }

    let mut tourist_memberships = 0;
    for (node, station) in board.nodes().iter().enumerate() {
        let lines = visited.iter().filter(|stations| stations.contains(&node)).count();

        if station.tourist {
            tourist_memberships += lines;
        }

        match lines {
            2 => sheet.bi_color += BI_COLOR_POINTS,
            3 => sheet.tri_color += TRI_COLOR_POINTS,
            4 => sheet.quad_color += QUAD_COLOR_POINTS,
            _ => {}
        }
    }
    sheet.tourist = tourist_bonus(tourist_memberships);

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::station;
    use crate::board::{BoardBuilder, Node};
    use crate::card::CardType;
    use crate::geometry::{Point, River};

    use pretty_assertions::assert_eq;

    /// Writes a record directly, the way a finished game would have left it.
    fn record(board: &mut Board, color: TrackColor, visited: &[NodeId]) {
        let track = &mut board.tracks[color.index()];
        track.visited.extend_from_slice(visited);
        for pair in visited.windows(2) {
            if let Some(edge) = board.edge_between(pair[0], pair[1]) {
                board.tracks[color.index()].claimed.push(edge);
            }
        }
    }

    /// A straight line of 8 stations along x, each linked to the next, with a river
    /// crossing the tracks at x = 2.5 and x = 5.5. Stations 0 and 1 are tourist sites.
    ///
    /// Regions: stations 0..=3 top middle, 4..=5 middle left, 6..=7 bottom right large.
    fn line_board() -> Board {
        let mut builder = BoardBuilder::new();
        for x in 0..8 {
            let region = match x {
                0..=3 => Region::TopMiddle,
                4..=5 => Region::MiddleLeft,
                _ => Region::BottomRightLarge,
            };
            let mut node: Node = station(CardType::Circle, region, x as f64, 0.0);
            node.tourist = x < 2;
            builder.add_node(node);
        }
        for x in 0..7 {
            builder.add_edge(x, x + 1);
        }
        builder.river(River::new(vec![
            Point::new(2.5, -1.0),
            Point::new(2.5, 1.0),
            Point::new(5.5, 1.0),
            Point::new(5.5, -1.0),
        ]));
        builder.build().unwrap()
    }

    #[test]
    fn empty_board_scores_nothing() {
        let sheet = score(&line_board());

        assert_eq!(sheet, ScoreSheet::default());
        assert_eq!(sheet.total(), 0);
    }

    #[test]
    fn color_score_by_hand() {
        let mut board = line_board();
        // 3 regions, 4 stations in the top middle, 2 river crossings.
        record(&mut board, TrackColor::Red, &[0, 1, 2, 3, 4, 5, 6]);

        let red = *score(&board).color(TrackColor::Red);
        assert_eq!(
            red,
            ColorScore {
                regions: 3,
                max_in_region: 4,
                crossings: 2,
                points: 16,
            }
        );
    }

    #[test]
    fn revisits_count_once() {
        let mut board = line_board();
        record(&mut board, TrackColor::Blue, &[2, 3, 2, 3]);

        let blue = *score(&board).color(TrackColor::Blue);
        assert_eq!(blue.regions, 1);
        assert_eq!(blue.max_in_region, 2);
        // The (2, 3) crossing was recorded three times.
        assert_eq!(blue.crossings, 1);
        assert_eq!(blue.points, 4);
    }

    #[test]
    fn shared_stations_fill_multi_color_buckets() {
        let mut board = line_board();
        record(&mut board, TrackColor::Red, &[6, 7]);
        record(&mut board, TrackColor::Blue, &[7]);
        record(&mut board, TrackColor::Green, &[4, 5]);
        record(&mut board, TrackColor::Purple, &[5, 4]);

        let sheet = score(&board);
        // Stations 4 and 5 shared by green and purple, 7 by red and blue.
        assert_eq!(sheet.bi_color, 3 * BI_COLOR_POINTS);
        assert_eq!(sheet.tri_color, 0);
        assert_eq!(sheet.quad_color, 0);

        record(&mut board, TrackColor::Red, &[5]);
        record(&mut board, TrackColor::Blue, &[5]);
        let sheet = score(&board);
        assert_eq!(sheet.bi_color, 2 * BI_COLOR_POINTS);
        assert_eq!(sheet.quad_color, QUAD_COLOR_POINTS);
    }

    #[test]
    fn tourist_memberships_are_counted_per_line() {
        let mut board = line_board();
        for color in TrackColor::iter() {
            record(&mut board, color, &[0, 1]);
        }

        let sheet = score(&board);
        // 2 tourist stations times 4 lines.
        assert_eq!(sheet.tourist, tourist_bonus(8));
        assert_eq!(sheet.tourist, 17);
        assert_eq!(sheet.quad_color, 2 * QUAD_COLOR_POINTS);
    }

    #[test]
    fn tourist_table_saturates() {
        assert_eq!(tourist_bonus(8), 17);
        assert_eq!(tourist_bonus(9), 21);
        assert_eq!(tourist_bonus(10), 21);
        assert_eq!(tourist_bonus(11), 25);
        assert_eq!(tourist_bonus(usize::MAX), 25);
    }

    #[test]
    fn score_map_keys() {
        let mut board = line_board();
        record(&mut board, TrackColor::Red, &[0, 1, 2, 3, 4, 5, 6]);
        record(&mut board, TrackColor::Green, &[3]);

        let sheet = score(&board);
        let map = sheet.to_map();

        assert_eq!(
            map.keys().map(String::as_str).collect::<Vec<_>>(),
            vec![
                "bi-color",
                "blue",
                "green",
                "purple",
                "quad-color",
                "red",
                "tourist",
                "tri-color"
            ]
        );
        assert_eq!(map["red"], 16);
        assert_eq!(map["green"], 1);
        assert_eq!(map["bi-color"], 2);
        assert_eq!(map["tourist"], 2);
        assert_eq!(map.values().sum::<u32>(), sheet.total());
    }
}
