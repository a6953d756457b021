pub trait ArtifactStore {
    fn put_text_object(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        content_type: &str,
    ) -> Result<(), String>;
}
