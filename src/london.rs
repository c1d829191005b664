//! The default board: 53 stations of London, the tracks between neighbouring stations,
//! and the Thames running across.

use crate::board::{Board, BoardBuilder, Node};
use crate::card::CardType;
use crate::error::ConstructionError;
use crate::geometry::{Point, River};
use crate::region::Region;
use crate::track_color::TrackColor;

/// Left and right bounds of the board, which the river spans.
const RIVER_START: f64 = -0.5;
const RIVER_END: f64 = 9.5;

const RIVER_SAMPLES: usize = 1000;

/// Stations at most this far apart on both axes are linked by a track.
const NEIGHBOUR_DISTANCE: f64 = 1.0;

lazy_static! {
    static ref THAMES: River = River::sample(thames_course, RIVER_START, RIVER_END, RIVER_SAMPLES);
}

/// Convenience macro to generate a station of the default board.
macro_rules! station {
    ($shape:ident, $region:ident, ($x:literal, $y:literal)) => {
        Node::new(
            CardType::$shape,
            false,
            Region::$region,
            Point::new($x as f64, $y as f64),
        )
    };
    ($shape:ident, $region:ident, ($x:literal, $y:literal), tourist) => {
        Node::new(
            CardType::$shape,
            true,
            Region::$region,
            Point::new($x as f64, $y as f64),
        )
    };
    ($shape:ident, $region:ident, ($x:literal, $y:literal), start $color:ident) => {
        station!($shape, $region, ($x, $y)).starting(TrackColor::$color)
    };
}

/// Height of the Thames at abscissa `x`.
///
/// # Example
/// ```
/// use london_system::london::thames_course;
///
/// assert_eq!(thames_course(0.0), 5.5);
/// assert_eq!(thames_course(3.0), 4.5);
/// assert_eq!(thames_course(8.0), 4.5);
/// ```
pub fn thames_course(x: f64) -> f64 {
    if x <= 2.0 {
        5.5
    } else if x <= 4.0 {
        7.5 - x
    } else if x <= 5.0 {
        3.5
    } else if x <= 6.0 {
        x - 1.5
    } else {
        4.5
    }
}

/// The Thames, sampled once and shared.
pub fn river() -> &'static River {
    &THAMES
}

/// Every station of the default board, in id order.
pub fn stations() -> Vec<Node> {
    vec![
        // Top left.
        station! {Pentagon, TopLeftSmall, (0, 9)},
        station! {Triangle, TopLeftLarge, (1, 9)},
        station! {Square, TopLeftLarge, (2, 9)},
        station! {Circle, TopLeftLarge, (0, 7)},
        station! {Pentagon, TopLeftLarge, (1, 8)},
        // Top middle.
        station! {Square, TopMiddle, (3, 8)},
        station! {Triangle, TopMiddle, (3, 7), start Green},
        station! {Triangle, TopMiddle, (4, 9)},
        station! {Circle, TopMiddle, (5, 9)},
        station! {Pentagon, TopMiddle, (6, 8), tourist},
        station! {Square, TopMiddle, (6, 7)},
        // Top right.
        station! {Triangle, TopRightLarge, (7, 9)},
        station! {Square, TopRightLarge, (8, 8)},
        station! {Pentagon, TopRightLarge, (9, 8)},
        station! {Triangle, TopRightLarge, (9, 7)},
        station! {Circle, TopRightSmall, (9, 9)},
        // Middle left.
        station! {Square, MiddleLeft, (0, 6), tourist},
        station! {Pentagon, MiddleLeft, (2, 6)},
        station! {Triangle, MiddleLeft, (1, 5)},
        station! {Pentagon, MiddleLeft, (0, 4)},
        station! {Square, MiddleLeft, (2, 5)},
        station! {Square, MiddleLeft, (2, 4), start Purple},
        // Middle.
        station! {Triangle, MiddleMiddle, (4, 6)},
        station! {Circle, MiddleMiddle, (6, 6)},
        station! {Pentagon, MiddleMiddle, (4, 5)},
        station! {Square, MiddleMiddle, (5, 5)},
        station! {Triangle, MiddleMiddle, (4, 3)},
        station! {Circle, MiddleMiddle, (4, 4)},
        station! {Pentagon, MiddleMiddle, (3, 3)},
        station! {Square, MiddleMiddle, (6, 3)},
        station! {Random, MiddleMiddle, (5, 6), tourist},
        // Middle right.
        station! {Circle, MiddleRight, (7, 6), start Red},
        station! {Triangle, MiddleRight, (7, 3)},
        station! {Square, MiddleRight, (9, 6)},
        station! {Pentagon, MiddleRight, (8, 5)},
        station! {Circle, MiddleRight, (7, 4)},
        station! {Triangle, MiddleRight, (9, 3), tourist},
        // Bottom left.
        station! {Triangle, BottomLeftSmall, (0, 0)},
        station! {Circle, BottomLeftLarge, (0, 2)},
        station! {Square, BottomLeftLarge, (1, 0)},
        station! {Circle, BottomLeftLarge, (1, 1)},
        station! {Square, BottomLeftLarge, (2, 2)},
        // Bottom middle.
        station! {Circle, BottomMiddle, (3, 2)},
        station! {Pentagon, BottomMiddle, (3, 0)},
        station! {Circle, BottomMiddle, (4, 0), tourist},
        station! {Triangle, BottomMiddle, (5, 0)},
        station! {Pentagon, BottomMiddle, (5, 2), start Blue},
        station! {Pentagon, BottomMiddle, (6, 1)},
        // Bottom right.
        station! {Circle, BottomRightLarge, (7, 0)},
        station! {Triangle, BottomRightLarge, (8, 1)},
        station! {Pentagon, BottomRightLarge, (9, 2)},
        station! {Circle, BottomRightLarge, (8, 2)},
        station! {Square, BottomRightSmall, (9, 0)},
    ]
}

#[inline]
fn are_neighbours(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= NEIGHBOUR_DISTANCE && (a.y - b.y).abs() <= NEIGHBOUR_DISTANCE
}

/// Builds the default board.
///
/// Every pair of stations at most one step apart on both axes, diagonals included,
/// is linked by a track.
///
/// # Example
/// ```
/// use london_system::london;
/// use london_system::track_color::TrackColor;
///
/// let board = london::board().unwrap();
/// assert_eq!(board.nodes().len(), 53);
/// assert!(board.start_node(TrackColor::Purple).is_some());
/// ```
pub fn board() -> Result<Board, ConstructionError> {
    let stations = stations();
    let positions: Vec<Point> = stations.iter().map(|node| node.xy).collect();

    let mut builder = BoardBuilder::new();
    for node in stations {
        builder.add_node(node);
    }

    for a in 0..positions.len() {
        for b in a + 1..positions.len() {
            if are_neighbours(positions[a], positions[b]) {
                builder.add_edge(a, b);
            }
        }
    }

    builder.river(river().clone());
    builder.build()
}
