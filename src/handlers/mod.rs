// Handler tiers: public liveness endpoints live in main.rs; everything under
// /api/admin sits behind the super-admin gate.
pub mod admin;
