/// ASCII rasterizer backend for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use log::{debug, warn};
use nalgebra::{Matrix3, Point3, Vector3, Vector4};
use orbit3d_core::resources::ResourceTable;
use orbit3d_core::{
    BackendError, DrawUniforms, FrameUniforms, Geometry, MeshHandle, RenderBackend, Transform,
};
use std::io::Write;

use crate::config::ShadingOptions;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Vertices closer to the eye plane than this are not projected.
const MIN_CLIP_W: f32 = 1e-4;

/// One character cell of the colour target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: [u8; 3],
}

/// Colour and depth targets sized to the terminal.
struct Target {
    width: usize,
    height: usize,
    depth: Vec<f32>,
    cells: Vec<Cell>,
    background: [u8; 3],
}

impl Target {
    fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; size],
            cells: vec![Cell { glyph: ' ', color: [0; 3] }; size],
            background: [0; 3],
        }
    }

    fn clear(&mut self, background: [u8; 3]) {
        self.background = background;
        self.depth.fill(f32::INFINITY);
        self.cells.fill(Cell {
            glyph: ' ',
            color: background,
        });
    }
}

/// A vertex after the vertex stage.
#[derive(Clone, Copy)]
struct Projected {
    screen: (f32, f32),
    depth: f32,
    inv_w: f32,
    world: Point3<f32>,
    normal: Vector3<f32>,
}

/// Software backend that rasterizes meshes into shaded character cells.
pub struct AsciiRenderer {
    target: Target,
    meshes: ResourceTable<Geometry>,
    frame: Option<FrameUniforms>,
    draw: Option<DrawUniforms>,
    shading: ShadingOptions,
    cull_back_faces: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, shading: ShadingOptions) -> Self {
        Self {
            target: Target::new(width, height),
            meshes: ResourceTable::new(),
            frame: None,
            draw: None,
            shading,
            cull_back_faces: true,
        }
    }

    pub fn set_cull_back_faces(&mut self, cull: bool) {
        self.cull_back_faces = cull;
    }

    pub fn size(&self) -> (usize, usize) {
        (self.target.width, self.target.height)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.target.width && y < self.target.height).then(|| self.target.cells[y * self.target.width + x])
    }

    /// Depth of the nearest fragment in NDC, or infinity if nothing covers the cell.
    pub fn depth(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.target.width && y < self.target.height).then(|| self.target.depth[y * self.target.width + x])
    }

    /// Write the colour target to the terminal, one row at a time.
    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let [r, g, b] = self.target.background;
        writer.queue(SetBackgroundColor(Color::Rgb { r, g, b }))?;

        let mut current = None;
        for y in 0..self.target.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for cell in &self.target.cells[y * self.target.width..(y + 1) * self.target.width] {
                if current != Some(cell.color) {
                    let [r, g, b] = cell.color;
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.glyph))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    fn rasterize(&mut self, handle: MeshHandle, frame: &FrameUniforms, draw: &DrawUniforms) -> Result<(), BackendError> {
        let geometry = self.meshes.get(handle).ok_or(BackendError::StaleHandle(handle))?;
        let target = &mut self.target;
        let (width, height) = (target.width as f32, target.height as f32);

        let mvp = Transform::mvp_matrix(&draw.model, &frame.view, &frame.projection);
        // Model matrices are rigid, so the linear part also transforms normals.
        let normal_matrix: Matrix3<f32> = draw.model.fixed_view::<3, 3>(0, 0).into_owned();

        let vertices: Vec<Option<Projected>> = geometry
            .positions
            .iter()
            .zip(&geometry.normals)
            .map(|(p, n)| {
                let clip: Vector4<f32> = mvp * p.to_homogeneous();
                if clip.w <= MIN_CLIP_W {
                    return None;
                }
                let inv_w = 1.0 / clip.w;
                Some(Projected {
                    screen: ((clip.x * inv_w + 1.0) * 0.5 * width, (1.0 - clip.y * inv_w) * 0.5 * height),
                    depth: clip.z * inv_w,
                    inv_w,
                    world: draw.model.transform_point(p),
                    normal: normal_matrix * n,
                })
            })
            .collect();

        for [i0, i1, i2] in geometry.triangles() {
            let (Some(v0), Some(v1), Some(v2)) = (
                vertices[usize::from(i0)],
                vertices[usize::from(i1)],
                vertices[usize::from(i2)],
            ) else {
                continue; // Crosses the eye plane
            };

            // Screen Y points down, so counter-clockwise triangles have negative area here.
            let area = (v1.screen.0 - v0.screen.0) * (v2.screen.1 - v0.screen.1)
                - (v2.screen.0 - v0.screen.0) * (v1.screen.1 - v0.screen.1);
            if area == 0.0 || (self.cull_back_faces && area > 0.0) {
                continue;
            }

            rasterize_triangle(target, [v0, v1, v2], |world, normal| {
                shade(&self.shading, frame, &draw.color, &world, &normal)
            });
        }
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    fn upload_geometry(&mut self, geometry: &Geometry) -> Result<MeshHandle, BackendError> {
        geometry.validate()?;
        let handle = self.meshes.insert(geometry.clone());
        debug!("uploaded mesh {handle} ({} triangles)", geometry.triangle_count());
        Ok(handle)
    }

    fn release(&mut self, handle: MeshHandle) -> Result<(), BackendError> {
        self.meshes
            .remove(handle)
            .map(|_| ())
            .ok_or(BackendError::StaleHandle(handle))
    }

    fn clear(&mut self, color: [f32; 3]) {
        self.target.clear(to_rgb(&Vector3::from(color)));
    }

    fn set_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.frame = Some(*uniforms);
    }

    fn set_draw_uniforms(&mut self, uniforms: &DrawUniforms) {
        self.draw = Some(*uniforms);
    }

    fn draw(&mut self, handle: MeshHandle) -> Result<(), BackendError> {
        let (Some(frame), Some(draw)) = (self.frame, self.draw) else {
            warn!("draw of {handle} skipped: uniforms not set");
            return Ok(());
        };
        self.rasterize(handle, &frame, &draw)
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        let background = self.target.background;
        self.target = Target::new(width as usize, height as usize);
        self.target.clear(background);
    }
}

/// Fill a triangle with depth testing, interpolating world position and
/// normal with perspective correction.
fn rasterize_triangle<F>(target: &mut Target, v: [Projected; 3], mut fragment: F)
where
    F: FnMut(Point3<f32>, Vector3<f32>) -> Cell,
{
    let xs = [v[0].screen.0, v[1].screen.0, v[2].screen.0];
    let ys = [v[0].screen.1, v[1].screen.1, v[2].screen.1];

    // Bounding box, clipped to screen bounds
    let min_x = xs.iter().copied().fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
    let max_x = (xs.iter().copied().fold(f32::NEG_INFINITY, f32::max).ceil() as i64).min(target.width as i64 - 1);
    let min_y = ys.iter().copied().fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
    let max_y = (ys.iter().copied().fold(f32::NEG_INFINITY, f32::max).ceil() as i64).min(target.height as i64 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x as f32 + 0.5, y as f32 + 0.5);
            let Some((w0, w1, w2)) = barycentric(v[0].screen, v[1].screen, v[2].screen, p) else {
                return;
            };
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // NDC depth is affine in screen space
            let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
            let idx = y as usize * target.width + x as usize;
            if !(-1.0..=1.0).contains(&depth) || depth >= target.depth[idx] {
                continue;
            }

            let (p0, p1, p2) = (w0 * v[0].inv_w, w1 * v[1].inv_w, w2 * v[2].inv_w);
            let sum = p0 + p1 + p2;
            let (p0, p1, p2) = (p0 / sum, p1 / sum, p2 / sum);
            let world = Point3::from(v[0].world.coords * p0 + v[1].world.coords * p1 + v[2].world.coords * p2);
            let normal = v[0].normal * p0 + v[1].normal * p1 + v[2].normal * p2;

            target.depth[idx] = depth;
            target.cells[idx] = fragment(world, normal);
        }
    }
}

/// Ambient plus Lambert diffuse plus Blinn-Phong specular from a point light.
fn shade(
    shading: &ShadingOptions,
    frame: &FrameUniforms,
    color: &Vector3<f32>,
    position: &Point3<f32>,
    normal: &Vector3<f32>,
) -> Cell {
    let n = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
    let to_light = (frame.light_position - position).try_normalize(f32::EPSILON).unwrap_or(n);
    let to_eye = (frame.camera_position - position).try_normalize(f32::EPSILON).unwrap_or(n);

    let diffuse = n.dot(&to_light).max(0.0);
    let specular = if diffuse > 0.0 {
        let half = (to_light + to_eye).try_normalize(f32::EPSILON).unwrap_or(n);
        n.dot(&half).max(0.0).powf(shading.shininess) * shading.specular
    } else {
        0.0
    };

    let lit = color * (shading.ambient + diffuse) + Vector3::repeat(specular);
    let brightness = (shading.ambient + diffuse * (1.0 - shading.ambient) + specular).clamp(0.0, 1.0);
    // Skip the blank glyph so covered cells stay visible in shadow
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = 1 + (brightness * (last - 1) as f32).round() as usize;

    Cell {
        glyph: LUMINOSITY_RAMP[index.min(last)],
        color: to_rgb(&lit),
    }
}

fn to_rgb(color: &Vector3<f32>) -> [u8; 3] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8).into()
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
