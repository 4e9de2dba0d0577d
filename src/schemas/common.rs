use poem_openapi::Object;

#[derive(Object, Debug)]
pub struct BadRequestResponse {
    pub message: String,
}

#[derive(Object, Debug, Clone)]
pub struct ValidateItem {
    pub loc: Vec<String>,
    pub msg: String,
}

#[derive(Object, Debug, Clone)]
pub struct UnprocessableEntityResponse {
    pub detail: Vec<ValidateItem>,
}

impl Default for UnprocessableEntityResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl UnprocessableEntityResponse {
    pub fn new() -> Self {
        Self { detail: vec![] }
    }

    pub fn add_error(&mut self, loc: Vec<String>, msg: String) {
        self.detail.push(ValidateItem { loc, msg });
    }
}
