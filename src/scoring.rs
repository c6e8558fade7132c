//! Star ratings from move counts.

/// Highest rating: finishing under par.
pub const MAX_STARS: u8 = 4;

/// Number of moves over par that still earn two stars.
const NEAR_PAR_MARGIN: u32 = 3;

/// Rates a completed level.
///
/// | moves                   | stars |
/// |-------------------------|-------|
/// | `< par`                 | 4     |
/// | `== par`                | 3     |
/// | `par + 1 ..= par + 3`   | 2     |
/// | `> par + 3`             | 1     |
pub fn star_rating(moves: u32, par: u32) -> u8 {
    if moves < par {
        MAX_STARS
    } else if moves == par {
        3
    } else if moves <= par.saturating_add(NEAR_PAR_MARGIN) {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_par() {
        assert_eq!(star_rating(8, 10), 4);
        assert_eq!(star_rating(1, 10), 4);
        assert_eq!(star_rating(9, 10), 4);
    }

    #[test]
    fn test_at_par() {
        assert_eq!(star_rating(10, 10), 3);
        assert_eq!(star_rating(5, 5), 3);
    }

    #[test]
    fn test_near_par() {
        assert_eq!(star_rating(11, 10), 2);
        assert_eq!(star_rating(13, 10), 2);
    }

    #[test]
    fn test_far_over_par() {
        assert_eq!(star_rating(14, 10), 1);
        assert_eq!(star_rating(100, 10), 1);
    }

    #[test]
    fn test_boundaries_around_par() {
        let par = 7;
        assert_eq!(star_rating(par - 1, par), 4);
        assert_eq!(star_rating(par, par), 3);
        assert_eq!(star_rating(par + 3, par), 2);
        assert_eq!(star_rating(par + 4, par), 1);
        assert_eq!(star_rating(0, 1), 4);
        assert_eq!(star_rating(5, 1), 1);
    }

    #[test]
    fn test_never_increases_with_more_moves() {
        for par in 0..12 {
            let mut previous = MAX_STARS;
            for moves in 0..30 {
                let stars = star_rating(moves, par);
                assert!((1..=MAX_STARS).contains(&stars));
                assert!(stars <= previous, "moves={moves} par={par}");
                previous = stars;
            }
        }
    }

    #[test]
    fn test_huge_par_does_not_overflow() {
        assert_eq!(star_rating(u32::MAX, u32::MAX), 3);
        assert_eq!(star_rating(u32::MAX, u32::MAX - 1), 2);
    }
}
