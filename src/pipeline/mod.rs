// Pipelines that drive the classifier over many posts.

pub mod batch;
