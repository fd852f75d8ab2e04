use serde::Serialize;

/// Success envelope shared by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub status: &'static str,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            status: "success",
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        #[derive(Serialize)]
        struct Payload {
            message: &'static str,
        }

        let json = serde_json::to_value(Envelope::success(Payload { message: "ok" })).unwrap();
        assert_eq!(json["code"], 200);
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["message"], "ok");
    }
}
