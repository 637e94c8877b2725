mod home;
mod quiz;

pub use home::HomeView;
pub use quiz::QuizView;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
