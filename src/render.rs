//! Frame drawing
//!
//! [`frame`] turns a world snapshot into a flat list of [`DrawCmd`]s. It reads
//! but never mutates simulation state, so the same snapshot always draws the
//! same picture. On wasm, [`CanvasPainter`] replays the list on a 2D canvas.

use glam::Vec2;

use crate::sim::World;

/// Bitmap assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Background,
    Player,
    Obstacle,
}

impl Sprite {
    pub const ALL: [Sprite; 3] = [Sprite::Background, Sprite::Player, Sprite::Obstacle];

    pub fn path(self) -> &'static str {
        match self {
            Sprite::Background => "assets/game_background.png",
            Sprite::Player => "assets/character_sprite.png",
            Sprite::Obstacle => "assets/obstacle_doll.png",
        }
    }
}

/// Fallback fills used until (or instead of) the bitmaps load
pub mod colors {
    pub const SKY: &str = "#E0F7FA";
    pub const GROUND: &str = "#81C784";
    pub const PLAYER: &str = "#FF5722";
    pub const OBSTACLE: &str = "#880E4F";
}

/// Obstacle artwork is wider than its hitbox
const OBSTACLE_ART_SIZE: Vec2 = Vec2::new(120.0, 120.0);
const OBSTACLE_ART_OFFSET_X: f32 = -10.0;

/// One drawing operation, in canvas pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear { size: Vec2 },
    Image { sprite: Sprite, pos: Vec2, size: Vec2 },
    Fill { color: &'static str, pos: Vec2, size: Vec2 },
}

/// Horizontally scrolling background
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Backdrop {
    /// In `(-width, 0]`
    pub offset: f32,
}

impl Backdrop {
    /// Background moves at half the run speed
    pub const PARALLAX: f32 = 0.5;

    pub fn scroll(&mut self, speed: f32, dt: f32, width: f32) {
        if width <= 0.0 {
            return;
        }
        self.offset -= speed * Self::PARALLAX * dt;
        if self.offset <= -width {
            self.offset = -(-self.offset % width);
        }
    }

    pub fn reset(&mut self) {
        self.offset = 0.0;
    }
}

/// Build the draw list for one frame. `loaded` reports whether a sprite's
/// bitmap is ready; missing bitmaps fall back to flat fills.
pub fn frame(world: &World, backdrop: &Backdrop, loaded: impl Fn(Sprite) -> bool) -> Vec<DrawCmd> {
    let vp = world.viewport;
    let size = Vec2::new(vp.width, vp.height);
    let mut cmds = Vec::with_capacity(4 + world.obstacles.len());

    cmds.push(DrawCmd::Clear { size });

    if loaded(Sprite::Background) {
        // Two tiles side by side cover the wrap seam
        for tile in 0..2 {
            cmds.push(DrawCmd::Image {
                sprite: Sprite::Background,
                pos: Vec2::new(backdrop.offset + tile as f32 * vp.width, 0.0),
                size,
            });
        }
    } else {
        let ground_y = world.ground_y();
        cmds.push(DrawCmd::Fill {
            color: colors::GROUND,
            pos: Vec2::new(0.0, ground_y),
            size: Vec2::new(vp.width, vp.height - ground_y),
        });
        cmds.push(DrawCmd::Fill {
            color: colors::SKY,
            pos: Vec2::ZERO,
            size: Vec2::new(vp.width, ground_y),
        });
    }

    let obstacle_art = loaded(Sprite::Obstacle);
    for obstacle in &world.obstacles {
        cmds.push(if obstacle_art {
            DrawCmd::Image {
                sprite: Sprite::Obstacle,
                pos: obstacle.pos + Vec2::new(OBSTACLE_ART_OFFSET_X, 0.0),
                size: OBSTACLE_ART_SIZE,
            }
        } else {
            DrawCmd::Fill {
                color: colors::OBSTACLE,
                pos: obstacle.pos,
                size: obstacle.size,
            }
        });
    }

    let player = &world.player;
    cmds.push(if loaded(Sprite::Player) {
        DrawCmd::Image {
            sprite: Sprite::Player,
            pos: player.pos,
            size: player.size,
        }
    } else {
        DrawCmd::Fill {
            color: colors::PLAYER,
            pos: player.pos,
            size: player.size,
        }
    });

    cmds
}

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

#[cfg(target_arch = "wasm32")]
mod canvas {
    use std::collections::HashMap;

    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    use super::{DrawCmd, Sprite};

    /// Executes draw lists on a 2D canvas context
    pub struct CanvasPainter {
        ctx: CanvasRenderingContext2d,
        images: HashMap<Sprite, HtmlImageElement>,
    }

    impl CanvasPainter {
        pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
            let ctx = canvas
                .get_context("2d")
                .ok()??
                .dyn_into::<CanvasRenderingContext2d>()
                .ok()?;

            let mut images = HashMap::new();
            for sprite in Sprite::ALL {
                match HtmlImageElement::new() {
                    Ok(img) => {
                        img.set_src(sprite.path());
                        images.insert(sprite, img);
                    }
                    Err(e) => log::warn!("Could not create image for {sprite:?}: {e:?}"),
                }
            }
            Some(Self { ctx, images })
        }

        pub fn is_loaded(&self, sprite: Sprite) -> bool {
            self.images
                .get(&sprite)
                .is_some_and(|img| img.complete() && img.natural_width() != 0)
        }

        pub fn paint(&self, cmds: &[DrawCmd]) {
            for cmd in cmds {
                match cmd {
                    DrawCmd::Clear { size } => {
                        self.ctx
                            .clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
                    }
                    DrawCmd::Image { sprite, pos, size } => {
                        let Some(img) = self.images.get(sprite) else {
                            continue;
                        };
                        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img,
                            pos.x as f64,
                            pos.y as f64,
                            size.x as f64,
                            size.y as f64,
                        );
                    }
                    DrawCmd::Fill { color, pos, size } => {
                        self.ctx.set_fill_style_str(color);
                        self.ctx
                            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                    }
                }
            }
        }
    }
}
