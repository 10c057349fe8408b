//! Camera 组件
//!
//! 保存相机的位置和朝向，并在每帧根据它们重新计算观察矩阵。

use crate::math::{matrix, Matrix4, Vector3};

/// Camera 组件
///
/// 旋转使用欧拉角（弧度）：x 为 pitch，y 为 yaw，z 为 roll。
#[derive(Debug, Clone)]
pub struct Camera {
    /// 世界空间位置
    position: Vector3,

    /// 欧拉角（弧度）
    rotation: Vector3,

    /// 最近一次 `render` 计算出的观察矩阵
    view_matrix: Matrix4,
}

impl Camera {
    /// 创建位于原点、无旋转的相机
    ///
    /// 在第一次调用 `render` 之前，观察矩阵为零矩阵。
    pub fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            view_matrix: Matrix4::zeros(),
        }
    }

    // ========== 位置与旋转 ==========

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
    }

    /// 欧拉角（弧度）
    pub fn rotation(&self) -> Vector3 {
        self.rotation
    }

    /// 设置欧拉角（弧度）：pitch, yaw, roll
    pub fn set_rotation(&mut self, pitch: f32, yaw: f32, roll: f32) {
        self.rotation = Vector3::new(pitch, yaw, roll);
    }

    // ========== 观察矩阵 ==========

    /// 根据当前位置和旋转重新计算观察矩阵
    pub fn render(&mut self) {
        let rotation = matrix::rotation_roll_pitch_yaw(self.rotation.x, self.rotation.y, self.rotation.z);

        let up = matrix::transform_coord(&Vector3::new(0.0, 1.0, 0.0), &rotation);
        let forward = matrix::transform_coord(&Vector3::new(0.0, 0.0, 1.0), &rotation);
        let target = self.position + forward;

        self.view_matrix = matrix::look_at_lh(&self.position, &target, &up);
    }

    /// 最近一次计算的观察矩阵
    pub fn view_matrix(&self) -> Matrix4 {
        self.view_matrix
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::utils::approx_eq;

    /// 零旋转时位于 (x, y, z)、朝 +Z 看的观察矩阵
    fn view_from(x: f32, y: f32, z: f32) -> Matrix4 {
        matrix::look_at_lh(
            &Vector3::new(x, y, z),
            &Vector3::new(x, y, z + 1.0),
            &Vector3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_view_matrix_before_render_is_zero() {
        let camera = Camera::new();
        assert_eq!(camera.view_matrix(), Matrix4::zeros());
    }

    #[test]
    fn test_render_default_camera() {
        let mut camera = Camera::new();
        camera.set_position(0.0, 0.0, -5.0);
        camera.render();

        let expected = matrix::look_at_lh(
            &Vector3::new(0.0, 0.0, -5.0),
            &Vector3::new(0.0, 0.0, -4.0),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(camera.view_matrix(), expected);
    }

    #[test]
    fn test_render_recomputes_after_move() {
        let mut camera = Camera::new();
        camera.set_position(0.0, 0.0, -5.0);
        camera.render();
        let before = camera.view_matrix();

        camera.set_position(2.0, 0.0, -5.0);
        // 移动后未 render，矩阵不变
        assert_eq!(camera.view_matrix(), before);

        camera.render();
        let after = camera.view_matrix();
        assert_ne!(after, before);
        assert_eq!(before, view_from(0.0, 0.0, -5.0));
        assert_eq!(after, view_from(2.0, 0.0, -5.0));
        assert!(approx_eq(after[(3, 0)], -2.0, 1e-5));
    }

    #[test]
    fn test_yaw_turns_view() {
        let mut camera = Camera::new();
        camera.set_rotation(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        camera.render();

        // 向右转 90 度后，+X 方向的点位于视线正前方
        let p = matrix::transform_coord(&Vector3::new(3.0, 0.0, 0.0), &camera.view_matrix());
        assert!(approx_eq(p.x, 0.0, 1e-5));
        assert!(approx_eq(p.z, 3.0, 1e-5));
        assert_eq!(camera.rotation(), Vector3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
    }
}
