mod quiz_handler_test;
