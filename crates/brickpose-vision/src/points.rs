use crate::error::Result;
use crate::lines::CanonicalLines;
use crate::scan::ColumnEdges;

/// The five named feature locations, generic over what is stored per name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Named<T> {
    pub mid: T,
    pub top: T,
    pub bot: T,
    pub left: T,
    pub right: T,
}

impl<T> Named<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Named<U> {
        Named { mid: f(self.mid), top: f(self.top), bot: f(self.bot), left: f(self.left), right: f(self.right) }
    }

    pub fn try_map<U, E>(self, mut f: impl FnMut(&'static str, T) -> Result<U, E>) -> Result<Named<U>, E> {
        Ok(Named {
            mid: f("mid", self.mid)?,
            top: f("top", self.top)?,
            bot: f("bot", self.bot)?,
            left: f("left", self.left)?,
            right: f("right", self.right)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        [("mid", &self.mid), ("top", &self.top), ("bot", &self.bot), ("left", &self.left), ("right", &self.right)]
            .into_iter()
    }
}

/// Pixel coordinates (x, y).
pub type FeaturePoints = Named<[i32; 2]>;

/// Places the five points from the scanned columns and the canonical lines.
///
/// The vertical center line is halfway between left and right; top and bottom
/// are where the canonical lines cross it, and mid/left/right sit at their mean
/// height. Line crossings are rounded to whole pixels, midpoints truncated.
pub fn synthesize(cols: ColumnEdges, lines: &CanonicalLines) -> Result<FeaturePoints> {
    let mid_x = ((cols.left + cols.right) / 2) as i32;
    let top = lines.top.y_at_checked(mid_x as f64)?.round() as i32;
    let bot = lines.bot.y_at_checked(mid_x as f64)?.round() as i32;
    let mid_y = ((top as f64 + bot as f64) / 2.0) as i32;

    Ok(Named {
        mid: [mid_x, mid_y],
        top: [mid_x, top],
        bot: [mid_x, bot],
        left: [cols.left as i32, mid_y],
        right: [cols.right as i32, mid_y],
    })
}
