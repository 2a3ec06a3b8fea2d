pub mod bullet;
pub mod enemy;

pub use bullet::BulletTuning;
pub use enemy::EnemyTuning;
