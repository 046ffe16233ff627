// Application layer: pipelines binding core transformations to storage.

pub mod pipelines;
