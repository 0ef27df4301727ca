#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rebody::{BodyInput, BodySource, BufferedBody, StreamBodySource};

    #[tokio::test]
    async fn stream_to_cursor_round_trip() {
        let payload = &b"event: push\ndata: {\"ref\":\"main\"}\n"[..];

        let mut source = StreamBodySource::new(payload);
        let mut body = BufferedBody::from_source(&mut source)
            .await
            .expect("failed to buffer stream");
        assert_eq!(body.len(), payload.len());

        // First consumer: verify a prefix, appending into its own buffer.
        let mut prefix = BytesMut::new();
        let ret = body
            .read(Some(6), Some(&mut prefix))
            .expect("sized read failed");
        assert_eq!(ret, None);
        assert_eq!(prefix, "event:");

        // Second consumer: rewind and take the body line by line.
        body.rewind();
        let mut lines = Vec::new();
        body.each_line(&mut |line| lines.push(line));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "event: push\n");
        assert_eq!(lines[1], "data: {\"ref\":\"main\"}\n");

        // Third consumer: rewind again and drain everything at once.
        body.rewind();
        let full = body
            .read(None, None)
            .expect("unsized read failed")
            .expect("remainder missing");
        assert_eq!(full, payload);
    }

    #[tokio::test]
    async fn cursor_works_behind_the_trait_object() {
        let mut source = StreamBodySource::new(&b"alpha\nbeta"[..]);
        let buffered = BufferedBody::from_source(&mut source)
            .await
            .expect("failed to buffer stream");

        // Hosts hold bodies behind the contract, not the concrete type.
        let mut body: Box<dyn BodyInput> = Box::new(buffered);
        assert_eq!(body.read_line().expect("first line missing"), "alpha\n");
        assert_eq!(body.read_line().expect("tail missing"), "beta");
        assert_eq!(body.read_line(), None);

        body.rewind();
        assert_eq!(body.read_all(), "alpha\nbeta");
        body.close();
    }

    #[tokio::test]
    async fn declared_length_is_transport_specific() {
        let source = StreamBodySource::new(&b"abc"[..]);
        assert_eq!(source.content_length(), None);
    }
}
