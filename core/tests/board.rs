use oasgen_core::oas::HttpMethod;
use oasgen_core::{
    compile_str, generate_sources, generated_header, AppError, CompilerConfig, Definition,
    FieldNaming, RustEmitter,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const TIC_TAC_TOE: &str = r#"
openapi: 3.1.0
info:
  title: Tic Tac Toe
  version: 1.0.0
paths:
  /board:
    get:
      operationId: getBoard
      summary: Get the whole board
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/status'
  /board/{row}/{column}:
    parameters:
      - name: row
        in: path
        required: true
        schema:
          $ref: '#/components/schemas/coordinate'
      - name: column
        in: path
        required: true
        schema:
          $ref: '#/components/schemas/coordinate'
    get:
      operationId: getSquare
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/mark'
        '400':
          description: The provided parameters are incorrect
          content:
            text/html:
              schema:
                $ref: '#/components/schemas/errorMessage'
    put:
      operationId: putSquare
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/mark'
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/status'
components:
  schemas:
    errorMessage:
      type: string
      maxLength: 256
      description: A text message describing an error
    coordinate:
      type: integer
      minimum: 1
      maximum: 3
    mark:
      type: string
      enum: ['.', X, O]
      description: Possible values for a board square. `.` means empty square.
    board:
      type: array
      maxItems: 3
      minItems: 3
      items:
        type: array
        maxItems: 3
        minItems: 3
        items:
          $ref: '#/components/schemas/mark'
    winner:
      type: string
      enum: ['.', X, O]
      description: Winner of the game. `.` means nobody has won yet.
    status:
      type: object
      properties:
        winner:
          $ref: '#/components/schemas/winner'
        board:
          $ref: '#/components/schemas/board'
"#;

#[test]
fn test_board_types() {
    let api = compile_str(TIC_TAC_TOE, &CompilerConfig::default()).unwrap();
    let names: Vec<_> = api.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ErrorMessage",
            "Coordinate",
            "Mark",
            "Board",
            "BoardItem",
            "Winner",
            "Status"
        ]
    );

    let status = api.find_type("Status").unwrap();
    let Definition::Object(fields) = &status.definition else {
        panic!("object expected")
    };
    let field_types: Vec<_> = fields.iter().map(|f| f.type_name.as_str()).collect();
    assert_eq!(field_types, vec!["Winner", "Board"]);
}

#[test]
fn test_board_operations_and_routes() {
    let api = compile_str(TIC_TAC_TOE, &CompilerConfig::default()).unwrap();
    let ops: Vec<_> = api
        .operations
        .iter()
        .map(|o| (o.method, o.path.as_str(), o.name.as_str()))
        .collect();
    assert_eq!(
        ops,
        vec![
            (HttpMethod::Get, "/board", "GetBoard"),
            (HttpMethod::Get, "/board/{row}/{column}", "GetSquare"),
            (HttpMethod::Put, "/board/{row}/{column}", "PutSquare"),
        ]
    );

    let routes: Vec<_> = api
        .routes
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str(), r.operation_name.as_str()))
        .collect();
    assert_eq!(
        routes,
        vec![
            ("GET", "/board", "GetBoard"),
            ("GET", "/board/:row/:column", "GetSquare"),
            ("PUT", "/board/:row/:column", "PutSquare"),
        ]
    );

    let put = api.find_operation("PutSquare").unwrap();
    assert_eq!(put.request_body_type.as_deref(), Some("Mark"));
    let params: Vec<_> = put.parameters.iter().map(|p| p.type_name.as_str()).collect();
    assert_eq!(params, vec!["Coordinate", "Coordinate"]);

    let get_square = api.find_operation("GetSquare").unwrap();
    assert_eq!(get_square.responses[1].type_name, None);
}

#[test]
fn test_board_payload_validation() {
    let api = compile_str(TIC_TAC_TOE, &CompilerConfig::default()).unwrap();
    let good = json!({
        "winner": ".",
        "board": [["X", ".", "."], [".", "O", "."], [".", ".", "X"]]
    });
    assert!(api.validate("Status", &good).is_ok());

    let bad = json!({
        "winner": "Z",
        "board": [["X", ".", "."], [".", "O"], [".", ".", "."]]
    });
    let errors = api.validate("Status", &bad).unwrap_err();
    assert_eq!(
        errors,
        vec![
            "$.winner: enum: \"Z\" is not an allowed value".to_string(),
            "$.board[1]: minItems: got 2, want 3".to_string(),
        ]
    );
}

#[test]
fn test_generated_sources() {
    let config = CompilerConfig::default();
    let api = compile_str(TIC_TAC_TOE, &config).unwrap();
    let header = generated_header("oasgen --spec tictactoe.yaml");
    let sources = generate_sources(&api, &RustEmitter::new(), &config, &header).unwrap();

    assert!(sources.models.starts_with("// Code generated by oasgen. DO NOT EDIT.\n"));
    assert!(sources
        .models
        .contains("/// A text message describing an error\n#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n#[serde(transparent)]\npub struct ErrorMessage(pub String);\n"));
    assert!(sources.models.contains("pub struct Board(pub Vec<BoardItem>);\n"));
    assert!(sources.models.contains("pub struct BoardItem(pub Vec<Mark>);\n"));
    assert!(sources.models.contains(
        "    #[serde(default, skip_serializing_if = \"Option::is_none\")]\n    pub winner: Option<Winner>,\n"
    ));

    assert!(sources.interface.contains("use crate::models::*;\n"));
    assert!(sources.interface.contains("pub trait Handlers {\n"));
    assert!(sources.interface.contains(
        "    fn put_square(\n        &self,\n        ctx: &Self::Context,\n        row: Coordinate,\n        column: Coordinate,\n        body: Mark,\n    )"
    ));
    assert!(sources.interface.contains(
        "pub const HANDLERS_ROUTES: &[(&str, &str, &str)] = &[\n    (\"GET\", \"/board\", \"get_board\"),\n    (\"GET\", \"/board/:row/:column\", \"get_square\"),\n    (\"PUT\", \"/board/:row/:column\", \"put_square\"),\n];\n"
    ));
}

#[test]
fn test_bare_field_naming_status_scenario() {
    let doc = r#"
openapi: 3.0.0
paths: {}
components:
  schemas:
    Status:
      type: object
      properties:
        winner: {type: string}
        board: {type: string}
"#;
    let config = CompilerConfig {
        field_naming: FieldNaming::Bare,
        ..CompilerConfig::default()
    };
    let api = compile_str(doc, &config).unwrap();
    let names: Vec<_> = api.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Status", "Winner", "Board"]);
}

#[test]
fn test_boolean_items_rejected() {
    let doc = r#"
openapi: 3.1.0
paths: {}
components:
  schemas:
    Anything:
      type: array
      items: true
"#;
    let err = compile_str(doc, &CompilerConfig::default()).unwrap_err();
    assert!(matches!(err, AppError::UnsupportedItemsType { .. }));
}
