//! 统一的数学库模块
//!
//! 提供图形编程常用的数学类型和函数。
//! 基于 `nalgebra` 但提供了更友好的 API。
//!
//! # 模块组织
//!
//! - **基础类型**：Vector3/4, Matrix4, Color
//! - **常量**：QUARTER_PI, EPSILON
//! - **矩阵辅助函数**：左手系投影、观察、旋转矩阵（见 `matrix`）
//!
//! # 矩阵约定
//!
//! `matrix` 中的函数遵循 DirectXMath 的行向量约定：点是行向量，
//! 变换写作 `v' = v · M`，平移位于第 4 行。矩阵仍然存放在 nalgebra
//! 的 `Matrix4` 中（列主序存储），`Matrix4::new` 的参数按行书写，
//! 因此 `m[(row, col)]` 与 DirectXMath 的 `m.r[row][col]` 一一对应。
//! 上传到 GPU 之前需要转置，见 `renderer::shader::MatrixBuffer`。

pub use nalgebra::{Matrix4 as Mat4, Vector3 as Vec3, Vector4 as Vec4};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;

/// 颜色类型（RGBA，范围 0.0-1.0）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// 创建新的颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 创建 RGB 颜色（alpha = 1.0）
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// 转换为数组，用于清屏颜色和顶点数据
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    // 预定义颜色
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
}

/// 数学常量
pub mod constants {
    /// π / 4，默认的垂直视场角
    pub const QUARTER_PI: f32 = std::f32::consts::FRAC_PI_4;

    /// 浮点比较容差
    pub const EPSILON: f32 = 1e-5;
}

/// 常用工具函数
pub mod utils {
    /// 近似相等比较
    pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
        (a - b).abs() < epsilon
    }
}

/// 矩阵辅助函数（左手系，行向量约定）
pub mod matrix {
    use super::*;

    /// 左手系透视投影矩阵
    ///
    /// 深度映射到 [0, 1]：`near` 处为 0，`far` 处为 1。
    pub fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        let h = 1.0 / (fov_y * 0.5).tan();
        let w = h / aspect;
        let r = far / (far - near);

        Matrix4::new(
            w,   0.0, 0.0,         0.0,
            0.0, h,   0.0,         0.0,
            0.0, 0.0, r,           1.0,
            0.0, 0.0, -r * near,   0.0,
        )
    }

    /// 左手系正交投影矩阵（以原点为中心）
    pub fn orthographic_lh(width: f32, height: f32, near: f32, far: f32) -> Matrix4 {
        let range = 1.0 / (far - near);

        Matrix4::new(
            2.0 / width, 0.0,          0.0,           0.0,
            0.0,         2.0 / height, 0.0,           0.0,
            0.0,         0.0,          range,         0.0,
            0.0,         0.0,          -range * near, 1.0,
        )
    }

    /// 左手系观察矩阵
    pub fn look_at_lh(eye: &Vector3, target: &Vector3, up: &Vector3) -> Matrix4 {
        let r2 = (target - eye).normalize();
        let r0 = up.cross(&r2).normalize();
        let r1 = r2.cross(&r0);

        Matrix4::new(
            r0.x,          r1.x,          r2.x,          0.0,
            r0.y,          r1.y,          r2.y,          0.0,
            r0.z,          r1.z,          r2.z,          0.0,
            -r0.dot(eye),  -r1.dot(eye),  -r2.dot(eye),  1.0,
        )
    }

    /// 绕 X 轴旋转
    pub fn rotation_x(angle: f32) -> Matrix4 {
        let (s, c) = angle.sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 绕 Y 轴旋转
    pub fn rotation_y(angle: f32) -> Matrix4 {
        let (s, c) = angle.sin_cos();
        Matrix4::new(
            c,   0.0, -s,  0.0,
            0.0, 1.0, 0.0, 0.0,
            s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 绕 Z 轴旋转
    pub fn rotation_z(angle: f32) -> Matrix4 {
        let (s, c) = angle.sin_cos();
        Matrix4::new(
            c,   s,   0.0, 0.0,
            -s,  c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// 由 pitch（X）、yaw（Y）、roll（Z）构造旋转矩阵
    ///
    /// 先 roll，再 pitch，最后 yaw。
    pub fn rotation_roll_pitch_yaw(pitch: f32, yaw: f32, roll: f32) -> Matrix4 {
        rotation_z(roll) * rotation_x(pitch) * rotation_y(yaw)
    }

    /// 变换一个点（w = 1），结果做透视除法
    pub fn transform_coord(point: &Vector3, m: &Matrix4) -> Vector3 {
        let row = Vector4::new(point.x, point.y, point.z, 1.0).transpose() * m;
        Vector3::new(row[0] / row[3], row[1] / row[3], row[2] / row[3])
    }

    /// 按行展开为数组，`rows(m)[i]` 是第 i 行
    pub fn rows(m: &Matrix4) -> [[f32; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = m[(i, j)];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::matrix::*;
    use super::utils::approx_eq;
    use super::constants::{EPSILON, QUARTER_PI};

    fn assert_vec_eq(a: Vector3, b: Vector3) {
        assert!(
            approx_eq(a.x, b.x, EPSILON) && approx_eq(a.y, b.y, EPSILON) && approx_eq(a.z, b.z, EPSILON),
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_color_creation() {
        let color = Color::rgb(1.0, 0.5, 0.0);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.a, 1.0);
        assert_eq!(Color::GREEN.to_array(), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let proj = perspective_fov_lh(QUARTER_PI, 800.0 / 600.0, 0.1, 1000.0);

        let near = transform_coord(&Vector3::new(0.0, 0.0, 0.1), &proj);
        let far = transform_coord(&Vector3::new(0.0, 0.0, 1000.0), &proj);
        assert!(approx_eq(near.z, 0.0, EPSILON));
        assert!(approx_eq(far.z, 1.0, 1e-4));

        // 视场角上边界投影到 y = 1
        let top = transform_coord(&Vector3::new(0.0, (QUARTER_PI * 0.5).tan(), 1.0), &proj);
        assert!(approx_eq(top.y, 1.0, EPSILON));
    }

    #[test]
    fn test_orthographic_lh() {
        let ortho = orthographic_lh(800.0, 600.0, 0.1, 1000.0);
        let corner = transform_coord(&Vector3::new(400.0, -300.0, 0.1), &ortho);
        assert_vec_eq(corner, Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_look_at_lh_default_camera() {
        let eye = Vector3::new(0.0, 0.0, -5.0);
        let view = look_at_lh(&eye, &Vector3::new(0.0, 0.0, -4.0), &Vector3::new(0.0, 1.0, 0.0));

        // 相机位于原点，世界原点在前方 5 个单位
        assert_vec_eq(transform_coord(&eye, &view), Vector3::zeros());
        assert_vec_eq(transform_coord(&Vector3::zeros(), &view), Vector3::new(0.0, 0.0, 5.0));
        assert!(approx_eq(view[(3, 2)], 5.0, EPSILON));
    }

    #[test]
    fn test_yaw_rotates_forward_towards_positive_x() {
        let r = rotation_roll_pitch_yaw(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let forward = transform_coord(&Vector3::new(0.0, 0.0, 1.0), &r);
        assert_vec_eq(forward, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_order_roll_then_pitch_then_yaw() {
        let (pitch, yaw, roll) = (0.3, -0.7, 1.1);
        let combined = rotation_roll_pitch_yaw(pitch, yaw, roll);
        let p = Vector3::new(1.0, 2.0, 3.0);

        let stepwise = transform_coord(
            &transform_coord(&transform_coord(&p, &rotation_z(roll)), &rotation_x(pitch)),
            &rotation_y(yaw),
        );
        assert_vec_eq(transform_coord(&p, &combined), stepwise);
    }

    #[test]
    fn test_rows_layout() {
        let m = Matrix4::new(
            1.0, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            9.0, 10.0, 11.0, 12.0,
            13.0, 14.0, 15.0, 16.0,
        );
        assert_eq!(rows(&m)[0], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(rows(&m)[3], [13.0, 14.0, 15.0, 16.0]);
    }
}
