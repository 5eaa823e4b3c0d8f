//! # Tile layer coverage
//!
//! Works out which tiles are needed to fill the map container and where each is drawn.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};
use serde::Serialize;

use super::TileLayerParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Address of a tile in the slippy map scheme.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// A tile to draw in the map container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub coord: TileCoord,

    pub url: String,

    /// Position of the tile's top left corner in the container.
    ///
    /// Units: pixels
    pub screen_px: [f64; 2],

    /// Drawn size of the tile, larger than the source size when the display zoom is deeper than
    /// the source serves.
    ///
    /// Units: pixels
    pub size_px: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TileCoord {
    /// Fill in the layer's URL template for this tile.
    pub fn url(&self, layer: &TileLayerParams) -> String {
        let s = match layer.subdomains.len() {
            0 => "",
            n => layer.subdomains[(self.x as usize + self.y as usize) % n].as_str(),
        };

        layer
            .url_template
            .replace("{s}", s)
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
            .replace("{r}", "")
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Zoom level tiles are requested at for a given display zoom.
pub fn tile_zoom(zoom: u8, layer: &TileLayerParams) -> u8 {
    zoom.min(layer.max_native_zoom)
}

/// List the tiles covering a container of `container_px` pixels whose centre shows the world
/// pixel `centre_px` at display zoom `zoom`.
///
/// Tiles are returned row by row from the top left. Columns wrap around the antimeridian, rows
/// beyond the poles are skipped.
pub fn tiles_covering(
    centre_px: Point2<f64>,
    zoom: u8,
    container_px: Vector2<f64>,
    layer: &TileLayerParams,
) -> Vec<Tile> {
    let tz = tile_zoom(zoom, layer);
    let scale = 2f64.powi((zoom - tz) as i32);
    let tile_size = layer.tile_size_px as f64;
    let drawn_size = tile_size * scale;
    let num_tiles = 1i64 << tz;

    // Container bounds in world pixels at the tile zoom
    let half = container_px / (2.0 * scale);
    let centre_tz = centre_px / scale;
    let min = centre_tz - half;
    let max = centre_tz + half;

    let x_range = (min.x / tile_size).floor() as i64..=((max.x / tile_size).ceil() as i64 - 1);
    let y_range = (min.y / tile_size).floor() as i64..=((max.y / tile_size).ceil() as i64 - 1);

    let mut tiles = Vec::new();

    for ty in y_range {
        if ty < 0 || ty >= num_tiles {
            continue;
        }

        for tx in x_range.clone() {
            let coord = TileCoord {
                x: tx.rem_euclid(num_tiles) as u32,
                y: ty as u32,
                z: tz,
            };

            tiles.push(Tile {
                url: coord.url(layer),
                coord,
                screen_px: [
                    (tx as f64 * tile_size - min.x) * scale,
                    (ty as f64 * tile_size - min.y) * scale,
                ],
                size_px: drawn_size,
            });
        }
    }

    tiles
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::map_disp::Params;

    fn layer() -> TileLayerParams {
        Params::default().tile_layer
    }

    #[test]
    fn test_url() {
        let l = layer();

        let c = TileCoord { x: 1, y: 1, z: 19 };
        assert_eq!(c.url(&l), "https://c.tile.openstreetmap.org/19/1/1.png");

        let c = TileCoord {
            x: 262_144,
            y: 174_591,
            z: 19,
        };
        assert_eq!(
            c.url(&l),
            "https://b.tile.openstreetmap.org/19/262144/174591.png"
        );
    }

    #[test]
    fn test_tile_zoom_capped() {
        let l = layer();
        assert_eq!(tile_zoom(22, &l), 19);
        assert_eq!(tile_zoom(12, &l), 12);
    }

    #[test]
    fn test_tiles_cover_container() {
        let l = layer();
        let container = Vector2::new(320.0, 400.0);

        // Centre on a tile corner at zoom 22, tiles are drawn 2048 px wide so the container sits
        // over the corner of four tiles.
        let centre = Point2::new(1000.0 * 2048.0, 500.0 * 2048.0);
        let tiles = tiles_covering(centre, 22, container, &l);

        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| t.size_px == 2048.0 && t.coord.z == 19));
        assert_eq!(tiles[0].coord, TileCoord { x: 999, y: 499, z: 19 });
        assert_eq!(tiles[3].coord, TileCoord { x: 1000, y: 500, z: 19 });

        // The corner shared by the four tiles is in the middle of the container
        assert_eq!(tiles[3].screen_px, [160.0, 200.0]);
        assert_eq!(tiles[0].screen_px, [160.0 - 2048.0, 200.0 - 2048.0]);

        // Every container corner is covered by a tile
        for corner in [[0.0, 0.0], [320.0, 0.0], [0.0, 400.0], [320.0, 400.0]].iter() {
            assert!(tiles.iter().any(|t| {
                corner[0] >= t.screen_px[0]
                    && corner[0] <= t.screen_px[0] + t.size_px
                    && corner[1] >= t.screen_px[1]
                    && corner[1] <= t.screen_px[1] + t.size_px
            }));
        }
    }

    #[test]
    fn test_tiles_wrap_and_clip() {
        let l = layer();
        let container = Vector2::new(320.0, 400.0);

        // Top left corner of the world at zoom 2, where tiles are not scaled
        let tiles = tiles_covering(Point2::new(0.0, 0.0), 2, container, &l);

        // Only the row below the pole, with the column left of the antimeridian wrapped around
        assert!(tiles.iter().all(|t| t.coord.y == 0));
        let xs: Vec<u32> = tiles.iter().map(|t| t.coord.x).collect();
        assert_eq!(xs, vec![3, 0]);
    }
}
