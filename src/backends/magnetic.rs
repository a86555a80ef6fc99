//! 磁気式アブソリュートエンコーダモジュール
//!
//! AS5047/AS5600/MT6701 のような N ビットの角度レジスタを持つ
//! 磁気センサーの生値をシャフト角（0～2π rad）に変換します。
//! バスアクセス自体はアプリケーション側の [`AngleRegister`] 実装が担当します。

use core::f32::consts::TAU;

use crate::config::{ConfigError, MAX_MAGNETIC_RESOLUTION_BITS};
use crate::sensor::RawAngleSource;

/// 角度レジスタの読み出し
pub trait AngleRegister {
    type Error;

    /// 角度レジスタの生値を読み出す（上位の未使用ビットはマスクされる）
    fn read_angle_register(&mut self) -> Result<u16, Self::Error>;
}

/// 磁気式エンコーダ
pub struct MagneticEncoder<R> {
    register: R,
    /// 分解能 [bit]
    resolution_bits: u8,
    /// 有効ビットのマスク
    mask: u16,
    /// 1回転あたりのカウント数（2^bits）
    counts_per_rev: f32,
    /// 前回の角度 [rad]（読み出し失敗時に使用）
    last_angle: f32,
    /// 読み出し失敗回数
    read_errors: u32,
}

impl<R: AngleRegister> MagneticEncoder<R> {
    /// 新しい磁気式エンコーダを作成
    ///
    /// # 引数
    /// * `register` - 角度レジスタ
    /// * `resolution_bits` - 分解能 [bit]（1～16、例: AS5047 = 14）
    pub fn new(register: R, resolution_bits: u8) -> Result<Self, ConfigError> {
        if resolution_bits == 0 || resolution_bits > MAX_MAGNETIC_RESOLUTION_BITS {
            return Err(ConfigError::InvalidResolution(resolution_bits));
        }
        let counts = 1u32 << resolution_bits;
        Ok(Self {
            register,
            resolution_bits,
            mask: (counts - 1) as u16,
            counts_per_rev: counts as f32,
            last_angle: 0.0,
            read_errors: 0,
        })
    }

    /// 分解能 [bit] を取得
    pub fn resolution_bits(&self) -> u8 {
        self.resolution_bits
    }

    /// 読み出し失敗回数を取得
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    pub fn register_mut(&mut self) -> &mut R {
        &mut self.register
    }

    /// レジスタ生値を角度 [rad] に変換
    #[inline]
    fn raw_to_angle(&self, raw: u16) -> f32 {
        (raw & self.mask) as f32 / self.counts_per_rev * TAU
    }
}

impl<R: AngleRegister> RawAngleSource for MagneticEncoder<R> {
    fn read_raw_angle(&mut self) -> f32 {
        match self.register.read_angle_register() {
            Ok(raw) => {
                self.last_angle = self.raw_to_angle(raw);
            }
            Err(_) => {
                // 失敗時は前回の角度を保持
                self.read_errors = self.read_errors.saturating_add(1);
                warn!(
                    "Angle register read failed (total {}), keeping {} rad",
                    self.read_errors, self.last_angle
                );
            }
        }
        self.last_angle
    }
}
